//! Remote backends behind one trait.
//!
//! The sync engine only ever talks to `RemoteStore`; which wire
//! protocol sits behind it is an adapter concern. Both adapters share
//! the retry transport and the error classification it produces.

pub mod pocketbase;
pub mod postgrest;
mod transport;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cpd_core::errors::CpdResult;

pub use pocketbase::PocketBaseRemote;
pub use postgrest::PostgrestRemote;
pub(crate) use transport::RetryTransport;

/// Collection name for assets on every backend.
pub const ASSETS: &str = "assets";
/// Collection name for subscriptions on every backend.
pub const SUBSCRIPTIONS: &str = "subscriptions";

/// One record as the backend stores it.
#[derive(Debug, Clone)]
pub struct RemoteRecord {
    /// Backend-assigned id.
    pub id: String,
    /// Server-side modification time, the last-write-wins clock.
    pub updated_at: DateTime<Utc>,
    /// The full payload, including the fields the mapper wrote.
    pub data: serde_json::Value,
}

/// A remote backend the sync engine can push to and pull from.
///
/// The contract is deliberately small: list/create/update scoped to an
/// owner, plus the cheap probes the engine's preflight and the
/// scheduler use. There is no remote delete; local deletes are handled
/// with tombstones on the storage side.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short name for log lines.
    fn backend_name(&self) -> &'static str;

    /// Whether enough configuration is present to attempt requests.
    fn is_configured(&self) -> bool;

    /// Whether credentials are present. No network round-trip.
    async fn is_authenticated(&self) -> bool;

    /// Cheap reachability probe, bounded to a few seconds. Feeds the
    /// status display and the scheduler gate, never the sync preflight.
    async fn health_check(&self) -> bool;

    /// Every record the owner has in `collection`. Adapters walk the
    /// backend's pagination internally and return the concatenation.
    async fn list_by_owner(
        &self,
        collection: &str,
        owner_id: &str,
    ) -> CpdResult<Vec<RemoteRecord>>;

    /// Create a record, returning the backend's id and clock.
    async fn create(
        &self,
        collection: &str,
        payload: &serde_json::Value,
    ) -> CpdResult<RemoteRecord>;

    /// Overwrite an existing record.
    async fn update(
        &self,
        collection: &str,
        remote_id: &str,
        payload: &serde_json::Value,
    ) -> CpdResult<RemoteRecord>;
}
