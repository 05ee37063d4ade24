//! # cpd-core
//!
//! Foundation crate for the cost-per-day tracker.
//! Defines the domain types, cost arithmetic, errors, and configuration.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod costs;
pub mod errors;
pub mod model;

// Re-export the most commonly used types at the crate root.
pub use config::{BackendConfig, BackendKind, SyncConfig};
pub use errors::{CpdError, CpdResult};
pub use model::{
    Asset, AssetCategory, AssetRole, AssetStatus, BillingCycle, Currency, MaintenanceEntry,
    Settings, Subscription, SubscriptionCategory, SubscriptionStatus,
};
