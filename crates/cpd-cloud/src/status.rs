//! Sync status as an observable value.
//!
//! One `watch` channel carries the current snapshot; subscribers see
//! it immediately and on every change. `pending_uploads` is recomputed
//! from the store on each broadcast, never cached, so it cannot drift
//! from the dirty flags.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use cpd_storage::Database;

/// A point-in-time snapshot of the sync machinery.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncStatus {
    pub is_online: bool,
    pub is_syncing: bool,
    /// When the last successful sync cycle finished.
    pub last_sync_at: Option<DateTime<Utc>>,
    /// Dirty records waiting for the next upload.
    pub pending_uploads: usize,
    /// Last failure, kept until the next successful sync.
    pub error: Option<String>,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            is_online: true,
            is_syncing: false,
            last_sync_at: None,
            pending_uploads: 0,
            error: None,
        }
    }
}

pub struct StatusBroadcaster {
    db: Arc<Database>,
    tx: watch::Sender<SyncStatus>,
}

impl StatusBroadcaster {
    pub fn new(db: Arc<Database>) -> Self {
        let initial = SyncStatus {
            pending_uploads: db.pending_upload_count().unwrap_or(0),
            last_sync_at: db.settings().ok().and_then(|s| s.last_synced_at),
            ..SyncStatus::default()
        };
        let (tx, _rx) = watch::channel(initial);
        Self { db, tx }
    }

    /// New subscribers get the current snapshot right away.
    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> SyncStatus {
        self.tx.borrow().clone()
    }

    pub fn is_online(&self) -> bool {
        self.tx.borrow().is_online
    }

    pub fn set_online(&self, online: bool) {
        let pending = self.pending();
        self.tx.send_modify(|status| {
            status.is_online = online;
            status.pending_uploads = pending;
        });
    }

    /// Recompute the pending count and rebroadcast.
    pub fn refresh(&self) {
        let pending = self.pending();
        self.tx.send_modify(|status| status.pending_uploads = pending);
    }

    pub(crate) fn begin_sync(&self) {
        let pending = self.pending();
        self.tx.send_modify(|status| {
            status.is_syncing = true;
            status.pending_uploads = pending;
        });
    }

    /// Final broadcast of a sync cycle. A failure sets the sticky
    /// error; a success clears it and stamps `last_sync_at`.
    pub(crate) fn finish_sync(&self, finished_at: Option<DateTime<Utc>>, error: Option<String>) {
        let pending = self.pending();
        self.tx.send_modify(|status| {
            status.is_syncing = false;
            status.pending_uploads = pending;
            if let Some(at) = finished_at {
                status.last_sync_at = Some(at);
            }
            status.error = error;
        });
    }

    fn pending(&self) -> usize {
        self.db.pending_upload_count().unwrap_or(0)
    }
}
