//! Domain model: syncable entities and the settings singleton.

mod asset;
mod settings;
mod subscription;

pub use asset::{Asset, AssetCategory, AssetRole, AssetStatus, Currency, MaintenanceEntry};
pub use settings::Settings;
pub use subscription::{BillingCycle, Subscription, SubscriptionCategory, SubscriptionStatus};
