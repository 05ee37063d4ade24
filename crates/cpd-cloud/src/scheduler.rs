//! Periodic background sync.
//!
//! One interval loop, no queueing, no retry of its own: a tick whose
//! gates fail is simply skipped and the next tick tries again. The
//! in-flight lock inside the engine makes an overlapping manual sync
//! harmless.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::{SyncDirection, SyncEngine};

pub struct AutoSync {
    handle: Option<JoinHandle<()>>,
}

impl AutoSync {
    /// Spawn the loop. The first tick fires immediately, then every
    /// configured interval; ticks missed while a sync runs long are
    /// skipped, not bunched.
    pub fn start(engine: Arc<SyncEngine>) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(engine.config().interval());
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if !engine.probe_health().await {
                    tracing::debug!("cloud: auto-sync tick skipped, backend unreachable");
                    continue;
                }
                if !engine.remote().is_authenticated().await {
                    tracing::debug!("cloud: auto-sync tick skipped, not authenticated");
                    continue;
                }
                let outcome = engine.sync(SyncDirection::Bidirectional).await;
                if !outcome.success {
                    tracing::warn!(errors = outcome.errors.len(), "cloud: auto-sync cycle had errors");
                }
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    /// Stop the loop. Idempotent; also runs on drop.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::info!("cloud: auto-sync stopped");
        }
    }
}

impl Drop for AutoSync {
    fn drop(&mut self) {
        self.stop();
    }
}
