//! # cpd-cloud
//!
//! Everything between the local store and a remote backend: the
//! `RemoteStore` trait with its two adapters, record mapping, the sync
//! engine, sync status broadcasting, and the auto-sync scheduler.

pub mod engine;
pub mod mapper;
pub mod remote;
pub mod scheduler;
pub mod status;

pub use engine::{SyncDirection, SyncEngine, SyncOutcome};
pub use remote::{PocketBaseRemote, PostgrestRemote, RemoteRecord, RemoteStore};
pub use scheduler::AutoSync;
pub use status::{StatusBroadcaster, SyncStatus};
