//! The sync engine: single-flight, preflight, bounded upload/download
//! phases, last-write-wins conflict handling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::timeout;

use cpd_core::config::SyncConfig;
use cpd_core::errors::{CpdError, CpdResult};
use cpd_core::model::Asset;
use cpd_storage::Database;

use crate::mapper;
use crate::remote::{RemoteRecord, RemoteStore, ASSETS, SUBSCRIPTIONS};
use crate::status::StatusBroadcaster;

/// Which phases to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDirection {
    Upload,
    Download,
    Bidirectional,
}

/// The result of one sync cycle. Errors are folded in here; `sync`
/// itself never returns `Err`.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    pub success: bool,
    pub uploaded: usize,
    pub downloaded: usize,
    /// Records where both sides had changed; remote won.
    pub conflicts: usize,
    pub errors: Vec<String>,
}

impl SyncOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
            ..Self::default()
        }
    }
}

pub struct SyncEngine {
    db: Arc<Database>,
    remote: Arc<dyn RemoteStore>,
    owner_id: String,
    config: SyncConfig,
    status: Arc<StatusBroadcaster>,
    flight: tokio::sync::Mutex<()>,
}

impl SyncEngine {
    pub fn new(
        db: Arc<Database>,
        remote: Arc<dyn RemoteStore>,
        owner_id: impl Into<String>,
        config: SyncConfig,
    ) -> Self {
        let status = Arc::new(StatusBroadcaster::new(db.clone()));
        Self {
            db,
            remote,
            owner_id: owner_id.into(),
            config,
            status,
            flight: tokio::sync::Mutex::new(()),
        }
    }

    pub fn status(&self) -> &Arc<StatusBroadcaster> {
        &self.status
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn remote(&self) -> &Arc<dyn RemoteStore> {
        &self.remote
    }

    /// Probe the backend and fold the answer into the online flag.
    pub async fn probe_health(&self) -> bool {
        let reachable = self.remote.health_check().await;
        self.status.set_online(reachable);
        reachable
    }

    /// Run one sync cycle.
    ///
    /// A cycle already in flight rejects immediately instead of
    /// queueing. Preflight checks run in a fixed order (configured,
    /// authenticated, online) before any store or network I/O. Each
    /// phase runs under the configured deadline; expiry keeps the
    /// partial counts and records an error. Whatever happens inside,
    /// the status broadcast and the `Syncing` reset go through the
    /// single exit below.
    pub async fn sync(&self, direction: SyncDirection) -> SyncOutcome {
        let _guard = match self.flight.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!("cloud: sync already in progress, rejecting");
                return SyncOutcome::failed("sync already in progress");
            }
        };

        if !self.remote.is_configured() {
            let outcome = SyncOutcome::failed("backend not configured");
            self.status
                .finish_sync(None, outcome.errors.first().cloned());
            return outcome;
        }
        if !self.remote.is_authenticated().await {
            let outcome = SyncOutcome::failed("not authenticated");
            self.status
                .finish_sync(None, outcome.errors.first().cloned());
            return outcome;
        }
        if !self.status.is_online() {
            let outcome = SyncOutcome::failed("offline");
            self.status
                .finish_sync(None, outcome.errors.first().cloned());
            return outcome;
        }

        self.status.begin_sync();
        tracing::info!(backend = self.remote.backend_name(), ?direction, "cloud: sync started");

        let mut outcome = SyncOutcome::default();
        let mut network_failed = false;

        if matches!(direction, SyncDirection::Upload | SyncDirection::Bidirectional) {
            let deadline = self.config.deadline();
            if timeout(deadline, self.upload_all(&mut outcome, &mut network_failed))
                .await
                .is_err()
            {
                outcome
                    .errors
                    .push(format!("upload phase exceeded {deadline:?} deadline"));
            }
        }

        if matches!(direction, SyncDirection::Download | SyncDirection::Bidirectional) {
            let deadline = self.config.deadline();
            if timeout(deadline, self.download_all(&mut outcome, &mut network_failed))
                .await
                .is_err()
            {
                outcome
                    .errors
                    .push(format!("download phase exceeded {deadline:?} deadline"));
            }
        }

        outcome.success = outcome.errors.is_empty();

        if network_failed {
            self.status.set_online(false);
        }

        // The cycle ran, so the global stamp moves even when individual
        // records failed; the sticky error string carries the failure.
        let now = Utc::now();
        if let Err(e) = self.db.set_last_synced_at(now) {
            tracing::warn!("cloud: failed to stamp last_synced_at: {e}");
        }
        if outcome.success {
            self.status.set_online(true);
        }

        let error = outcome.errors.first().cloned();
        self.status.finish_sync(Some(now), error);
        tracing::info!(
            uploaded = outcome.uploaded,
            downloaded = outcome.downloaded,
            conflicts = outcome.conflicts,
            errors = outcome.errors.len(),
            "cloud: sync finished"
        );
        outcome
    }

    // --- upload ---

    async fn upload_all(&self, outcome: &mut SyncOutcome, network_failed: &mut bool) {
        let assets = match self.db.unsynced_assets() {
            Ok(assets) => assets,
            Err(e) => {
                outcome.errors.push(format!("reading dirty assets: {e}"));
                return;
            }
        };
        for asset in &assets {
            match self.upload_asset(asset).await {
                Ok(()) => outcome.uploaded += 1,
                Err(err) => {
                    tracing::warn!(asset_id = %asset.id, "cloud: asset upload failed: {err}");
                    let halt = halts_batch(&err);
                    note_network(&err, network_failed);
                    outcome.errors.push(format!("asset {}: {err}", asset.id));
                    if halt {
                        break;
                    }
                }
            }
        }

        let subs = match self.db.unsynced_subscriptions() {
            Ok(subs) => subs,
            Err(e) => {
                outcome
                    .errors
                    .push(format!("reading dirty subscriptions: {e}"));
                return;
            }
        };
        for sub in &subs {
            match self.upload_subscription(sub).await {
                Ok(()) => outcome.uploaded += 1,
                Err(err) => {
                    tracing::warn!(subscription_id = %sub.id, "cloud: subscription upload failed: {err}");
                    let halt = halts_batch(&err);
                    note_network(&err, network_failed);
                    outcome
                        .errors
                        .push(format!("subscription {}: {err}", sub.id));
                    if halt {
                        break;
                    }
                }
            }
        }
    }

    /// Create on first upload, update ever after. The handshake links
    /// the remote id and clears the dirty flag, stamping the server's
    /// clock so later downloads compare against the same timeline.
    async fn upload_asset(&self, asset: &Asset) -> CpdResult<()> {
        let payload = mapper::asset_to_remote(asset, &self.owner_id)?;
        let record = match &asset.remote_id {
            Some(remote_id) => self.remote.update(ASSETS, remote_id, &payload).await?,
            None => self.remote.create(ASSETS, &payload).await?,
        };
        self.db
            .mark_asset_synced(&asset.id, &record.id, record.updated_at)?;
        Ok(())
    }

    async fn upload_subscription(&self, sub: &cpd_core::model::Subscription) -> CpdResult<()> {
        let payload = mapper::subscription_to_remote(sub, &self.owner_id)?;
        let record = match &sub.remote_id {
            Some(remote_id) => self.remote.update(SUBSCRIPTIONS, remote_id, &payload).await?,
            None => self.remote.create(SUBSCRIPTIONS, &payload).await?,
        };
        self.db
            .mark_subscription_synced(&sub.id, &record.id, record.updated_at)?;
        Ok(())
    }

    // --- download ---

    async fn download_all(&self, outcome: &mut SyncOutcome, network_failed: &mut bool) {
        match self.remote.list_by_owner(ASSETS, &self.owner_id).await {
            Ok(records) => {
                for record in records {
                    match self.apply_asset_record(&record) {
                        Ok(Applied::Yes { conflict }) => {
                            outcome.downloaded += 1;
                            if conflict {
                                outcome.conflicts += 1;
                            }
                        }
                        Ok(Applied::No) => {}
                        Err(err) => {
                            outcome
                                .errors
                                .push(format!("remote asset {}: {err}", record.id));
                        }
                    }
                }
            }
            Err(err) => {
                note_network(&err, network_failed);
                outcome.errors.push(format!("listing assets: {err}"));
            }
        }

        match self.remote.list_by_owner(SUBSCRIPTIONS, &self.owner_id).await {
            Ok(records) => {
                for record in records {
                    match self.apply_subscription_record(&record) {
                        Ok(Applied::Yes { conflict }) => {
                            outcome.downloaded += 1;
                            if conflict {
                                outcome.conflicts += 1;
                            }
                        }
                        Ok(Applied::No) => {}
                        Err(err) => {
                            outcome
                                .errors
                                .push(format!("remote subscription {}: {err}", record.id));
                        }
                    }
                }
            }
            Err(err) => {
                note_network(&err, network_failed);
                outcome.errors.push(format!("listing subscriptions: {err}"));
            }
        }
    }

    /// Fold one downloaded asset into the store.
    ///
    /// Tombstoned ids are skipped. A linked local row follows
    /// last-write-wins on the server clock: strictly newer remote wins;
    /// if the local copy was dirty at the same time, that is a counted
    /// conflict (remote still wins). An unlinked record first tries the
    /// payload's `local_id` to re-link an existing row, otherwise it
    /// inserts fresh.
    fn apply_asset_record(&self, record: &RemoteRecord) -> CpdResult<Applied> {
        if self.db.is_tombstoned(ASSETS, &record.id)? {
            tracing::debug!(remote_id = %record.id, "cloud: skipping tombstoned asset");
            return Ok(Applied::No);
        }

        if let Some(local) = self.db.find_asset_by_remote_id(&record.id)? {
            let local_clock = local.last_synced_at.unwrap_or(DateTime::<Utc>::MIN_UTC);
            if record.updated_at <= local_clock {
                return Ok(Applied::No);
            }
            let conflict = !local.synced;
            if conflict {
                tracing::warn!(
                    asset_id = %local.id,
                    remote_id = %record.id,
                    "cloud: both sides changed, remote wins"
                );
            }
            let incoming = mapper::asset_from_remote(record, Some(&local.id))?;
            self.db.apply_remote_asset(&incoming)?;
            return Ok(Applied::Yes { conflict });
        }

        // Only an unmapped local row may be claimed through `local_id`.
        // A row already linked to a different remote record keeps its
        // linkage; the incoming record lands under a fresh id instead.
        let incoming = match mapper::wire_local_id(record) {
            Some(local_id) => match self.db.get_asset(local_id)? {
                Some(local) if local.remote_id.is_none() => {
                    mapper::asset_from_remote(record, Some(&local.id))?
                }
                Some(_) => {
                    let fresh = uuid::Uuid::new_v4().to_string();
                    mapper::asset_from_remote(record, Some(&fresh))?
                }
                None => mapper::asset_from_remote(record, None)?,
            },
            None => mapper::asset_from_remote(record, None)?,
        };
        self.db.apply_remote_asset(&incoming)?;
        Ok(Applied::Yes { conflict: false })
    }

    fn apply_subscription_record(&self, record: &RemoteRecord) -> CpdResult<Applied> {
        if self.db.is_tombstoned(SUBSCRIPTIONS, &record.id)? {
            tracing::debug!(remote_id = %record.id, "cloud: skipping tombstoned subscription");
            return Ok(Applied::No);
        }

        if let Some(local) = self.db.find_subscription_by_remote_id(&record.id)? {
            let local_clock = local.last_synced_at.unwrap_or(DateTime::<Utc>::MIN_UTC);
            if record.updated_at <= local_clock {
                return Ok(Applied::No);
            }
            let conflict = !local.synced;
            if conflict {
                tracing::warn!(
                    subscription_id = %local.id,
                    remote_id = %record.id,
                    "cloud: both sides changed, remote wins"
                );
            }
            let incoming = mapper::subscription_from_remote(record, Some(&local.id))?;
            self.db.apply_remote_subscription(&incoming)?;
            return Ok(Applied::Yes { conflict });
        }

        let incoming = match mapper::wire_local_id(record) {
            Some(local_id) => match self.db.get_subscription(local_id)? {
                Some(local) if local.remote_id.is_none() => {
                    mapper::subscription_from_remote(record, Some(&local.id))?
                }
                Some(_) => {
                    let fresh = uuid::Uuid::new_v4().to_string();
                    mapper::subscription_from_remote(record, Some(&fresh))?
                }
                None => mapper::subscription_from_remote(record, None)?,
            },
            None => mapper::subscription_from_remote(record, None)?,
        };
        self.db.apply_remote_subscription(&incoming)?;
        Ok(Applied::Yes { conflict: false })
    }
}

enum Applied {
    Yes { conflict: bool },
    No,
}

fn halts_batch(err: &CpdError) -> bool {
    matches!(err, CpdError::RemoteError(re) if re.halts_batch())
}

fn note_network(err: &CpdError, network_failed: &mut bool) {
    if matches!(err, CpdError::RemoteError(cpd_core::errors::RemoteError::Network { .. })) {
        *network_failed = true;
    }
}
