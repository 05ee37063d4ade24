//! Database handle: one serialized connection behind a mutex.
//!
//! All access funnels through `with_conn`, so callers never hold the
//! lock across anything but their own closure. Writes and reads share
//! the single connection; the workload is a handful of rows per sync
//! cycle, not a query farm.

pub mod pragmas;

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::Connection;

use cpd_core::errors::CpdResult;
use cpd_core::model::{Asset, AssetStatus, Settings, Subscription, SubscriptionStatus};

use crate::migrations;
use crate::queries::{asset_ops, settings_ops, subscription_ops, tombstone_ops};
use crate::to_storage_err;

/// The local store. Owns the SQLite connection and exposes the CRUD
/// surface the application and the sync engine use.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open a database file, applying pragmas and pending migrations.
    pub fn open(path: &Path) -> CpdResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> CpdResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> CpdResult<Self> {
        pragmas::apply_pragmas(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run a closure against the connection under the lock.
    pub fn with_conn<F, T>(&self, f: F) -> CpdResult<T>
    where
        F: FnOnce(&Connection) -> CpdResult<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| to_storage_err("connection mutex poisoned"))?;
        f(&conn)
    }

    // --- assets ---

    pub fn add_asset(&self, asset: &Asset) -> CpdResult<()> {
        self.with_conn(|conn| asset_ops::insert_asset(conn, asset))
    }

    pub fn get_asset(&self, id: &str) -> CpdResult<Option<Asset>> {
        self.with_conn(|conn| asset_ops::get_asset(conn, id))
    }

    pub fn all_assets(&self) -> CpdResult<Vec<Asset>> {
        self.with_conn(asset_ops::get_all_assets)
    }

    pub fn assets_by_status(&self, status: AssetStatus) -> CpdResult<Vec<Asset>> {
        self.with_conn(|conn| asset_ops::assets_by_status(conn, status))
    }

    /// Content update from the application. Always marks the row dirty
    /// so the next sync cycle uploads it.
    pub fn update_asset(&self, asset: &Asset) -> CpdResult<()> {
        self.with_conn(|conn| asset_ops::update_asset(conn, asset))
    }

    /// Delete an asset. If it was ever uploaded, a tombstone is left so
    /// the next download does not resurrect it.
    pub fn delete_asset(&self, id: &str) -> CpdResult<()> {
        self.with_conn(|conn| asset_ops::delete_asset(conn, id))
    }

    // --- subscriptions ---

    pub fn add_subscription(&self, sub: &Subscription) -> CpdResult<()> {
        self.with_conn(|conn| subscription_ops::insert_subscription(conn, sub))
    }

    pub fn get_subscription(&self, id: &str) -> CpdResult<Option<Subscription>> {
        self.with_conn(|conn| subscription_ops::get_subscription(conn, id))
    }

    pub fn all_subscriptions(&self) -> CpdResult<Vec<Subscription>> {
        self.with_conn(subscription_ops::get_all_subscriptions)
    }

    pub fn subscriptions_by_status(
        &self,
        status: SubscriptionStatus,
    ) -> CpdResult<Vec<Subscription>> {
        self.with_conn(|conn| subscription_ops::subscriptions_by_status(conn, status))
    }

    /// Content update from the application. Always marks the row dirty.
    pub fn update_subscription(&self, sub: &Subscription) -> CpdResult<()> {
        self.with_conn(|conn| subscription_ops::update_subscription(conn, sub))
    }

    pub fn delete_subscription(&self, id: &str) -> CpdResult<()> {
        self.with_conn(|conn| subscription_ops::delete_subscription(conn, id))
    }

    // --- settings ---

    pub fn settings(&self) -> CpdResult<Settings> {
        self.with_conn(settings_ops::get_settings)
    }

    pub fn update_settings(&self, settings: &Settings) -> CpdResult<()> {
        self.with_conn(|conn| settings_ops::update_settings(conn, settings))
    }

    // --- sync bookkeeping (engine-only surface) ---

    pub fn unsynced_assets(&self) -> CpdResult<Vec<Asset>> {
        self.with_conn(asset_ops::find_unsynced)
    }

    pub fn unsynced_subscriptions(&self) -> CpdResult<Vec<Subscription>> {
        self.with_conn(subscription_ops::find_unsynced)
    }

    /// Dirty records across both entity tables, for status reporting.
    pub fn pending_upload_count(&self) -> CpdResult<usize> {
        self.with_conn(|conn| {
            Ok(asset_ops::count_unsynced(conn)? + subscription_ops::count_unsynced(conn)?)
        })
    }

    pub fn find_asset_by_remote_id(&self, remote_id: &str) -> CpdResult<Option<Asset>> {
        self.with_conn(|conn| asset_ops::find_by_remote_id(conn, remote_id))
    }

    pub fn find_subscription_by_remote_id(
        &self,
        remote_id: &str,
    ) -> CpdResult<Option<Subscription>> {
        self.with_conn(|conn| subscription_ops::find_by_remote_id(conn, remote_id))
    }

    /// Record the remote linkage and clear the dirty flag after a
    /// successful upload.
    pub fn mark_asset_synced(
        &self,
        id: &str,
        remote_id: &str,
        at: DateTime<Utc>,
    ) -> CpdResult<()> {
        self.with_conn(|conn| asset_ops::mark_synced(conn, id, remote_id, at))
    }

    pub fn mark_subscription_synced(
        &self,
        id: &str,
        remote_id: &str,
        at: DateTime<Utc>,
    ) -> CpdResult<()> {
        self.with_conn(|conn| subscription_ops::mark_synced(conn, id, remote_id, at))
    }

    /// Engine-only write of a downloaded record: stores the full row
    /// with `synced = 1`, never marks it dirty.
    pub fn apply_remote_asset(&self, asset: &Asset) -> CpdResult<()> {
        self.with_conn(|conn| asset_ops::apply_remote(conn, asset))
    }

    pub fn apply_remote_subscription(&self, sub: &Subscription) -> CpdResult<()> {
        self.with_conn(|conn| subscription_ops::apply_remote(conn, sub))
    }

    pub fn is_tombstoned(&self, collection: &str, remote_id: &str) -> CpdResult<bool> {
        self.with_conn(|conn| tombstone_ops::is_tombstoned(conn, collection, remote_id))
    }

    /// Stamp the global "last synced" timestamp shown to the user.
    pub fn set_last_synced_at(&self, at: DateTime<Utc>) -> CpdResult<()> {
        self.with_conn(|conn| settings_ops::set_last_synced_at(conn, at))
    }
}
