//! Configuration surface: which backend is active and how sync runs.
//!
//! Absence of a backend config makes the system purely local — every
//! remote-adapter method reports "not configured". Credentials arrive
//! here from the host application; auth flows themselves are out of
//! scope.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which remote backend implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Self-hosted record store (PocketBase-style REST collections).
    PocketBase,
    /// Managed Postgres-backed store (PostgREST/Supabase-style tables).
    Postgrest,
}

/// Connection parameters for the active backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Base URL, no trailing slash.
    pub base_url: String,
    /// Project API key (required for Postgrest, unused for PocketBase).
    pub api_key: Option<String>,
    /// Session token for authenticated requests.
    pub auth_token: Option<String>,
    /// Remote owner id all records are scoped to.
    pub owner_id: String,
}

impl BackendConfig {
    /// Whether enough parameters are present to attempt a connection.
    pub fn is_configured(&self) -> bool {
        let has_url = !self.base_url.is_empty();
        match self.kind {
            BackendKind::PocketBase => has_url,
            BackendKind::Postgrest => has_url && self.api_key.as_deref().is_some_and(|k| !k.is_empty()),
        }
    }
}

/// Sync engine tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Interval between automatic sync ticks (seconds).
    pub interval_secs: u64,
    /// Remote list page size.
    pub page_size: usize,
    /// Wall-clock budget per sync phase (seconds). A stuck network
    /// call cannot wedge the single-flight lock past this.
    pub deadline_secs: u64,
    /// Per-request HTTP timeout (seconds).
    pub request_timeout_secs: u64,
    /// Health probe timeout (seconds).
    pub health_timeout_secs: u64,
    /// Retries per HTTP request on 5xx/transport failure.
    pub max_retries: u32,
    /// Initial retry backoff (doubles each attempt).
    pub initial_backoff_ms: u64,
    /// Backoff ceiling.
    pub max_backoff_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            page_size: 100,
            deadline_secs: 120,
            request_timeout_secs: 30,
            health_timeout_secs: 5,
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
        }
    }
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_secs(self.health_timeout_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}
