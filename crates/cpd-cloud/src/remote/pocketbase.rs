//! PocketBase-style adapter: REST collections under
//! `/api/collections/{name}/records`, page/perPage pagination, owner
//! scoping through a `user` relation field.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use cpd_core::config::{BackendConfig, SyncConfig};
use cpd_core::errors::{CpdResult, RemoteError};

use super::{RemoteRecord, RemoteStore, RetryTransport};

#[derive(Debug, Deserialize)]
struct ListPage {
    items: Vec<serde_json::Value>,
    #[serde(rename = "totalPages")]
    total_pages: u64,
}

pub struct PocketBaseRemote {
    config: BackendConfig,
    sync: SyncConfig,
    transport: RetryTransport,
}

impl PocketBaseRemote {
    pub fn new(config: BackendConfig, sync: SyncConfig) -> CpdResult<Self> {
        let transport = RetryTransport::new(&sync)?;
        Ok(Self {
            config,
            sync,
            transport,
        })
    }

    fn records_url(&self, collection: &str) -> String {
        format!(
            "{}/api/collections/{collection}/records",
            self.config.base_url
        )
    }

    fn auth_header(&self) -> Option<&str> {
        self.config.auth_token.as_deref().filter(|t| !t.is_empty())
    }

    fn to_record(&self, item: serde_json::Value) -> Result<RemoteRecord, RemoteError> {
        let id = item
            .get("id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RemoteError::Validation {
                reason: "record without id".to_string(),
            })?
            .to_string();
        let updated = item
            .get("updated")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RemoteError::Validation {
                reason: format!("record {id} without updated stamp"),
            })?;
        let updated_at = parse_timestamp(updated)?;
        Ok(RemoteRecord {
            id,
            updated_at,
            data: item,
        })
    }
}

/// The server emits `2024-01-02 03:04:05.678Z` (space-separated);
/// RFC 3339 is accepted too.
fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, RemoteError> {
    let candidate = if text.contains(' ') {
        text.replacen(' ', "T", 1)
    } else {
        text.to_string()
    };
    DateTime::parse_from_rfc3339(&candidate)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| RemoteError::Validation {
            reason: format!("bad timestamp '{text}': {e}"),
        })
}

/// A short page or the last reported page ends the walk; anything else
/// means another request.
fn has_more(fetched: usize, per_page: usize, page: u64, total_pages: u64) -> bool {
    fetched >= per_page && page < total_pages
}

#[async_trait]
impl RemoteStore for PocketBaseRemote {
    fn backend_name(&self) -> &'static str {
        "pocketbase"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn is_authenticated(&self) -> bool {
        self.auth_header().is_some()
    }

    async fn health_check(&self) -> bool {
        if !self.is_configured() {
            return false;
        }
        let url = format!("{}/api/health", self.config.base_url);
        let resp = self
            .transport
            .client()
            .get(&url)
            .timeout(self.sync.health_timeout())
            .send()
            .await;
        matches!(resp, Ok(r) if r.status().is_success())
    }

    async fn list_by_owner(
        &self,
        collection: &str,
        owner_id: &str,
    ) -> CpdResult<Vec<RemoteRecord>> {
        if !self.is_configured() {
            return Err(RemoteError::NotConfigured.into());
        }
        let url = self.records_url(collection);
        let filter = format!("user = \"{owner_id}\"");
        let per_page = self.sync.page_size;
        let mut records = Vec::new();
        let mut page: u64 = 1;

        loop {
            let body = self
                .transport
                .execute(collection, |client| {
                    let mut req = client.get(&url).query(&[
                        ("page", page.to_string()),
                        ("perPage", per_page.to_string()),
                        ("filter", filter.clone()),
                        ("sort", "-updated".to_string()),
                    ]);
                    if let Some(token) = self.auth_header() {
                        req = req.header("Authorization", token);
                    }
                    req
                })
                .await?;

            let list: ListPage =
                serde_json::from_value(body).map_err(|e| RemoteError::Validation {
                    reason: format!("unexpected list response: {e}"),
                })?;
            let fetched = list.items.len();
            for item in list.items {
                records.push(self.to_record(item)?);
            }
            if !has_more(fetched, per_page, page, list.total_pages) {
                break;
            }
            page += 1;
        }

        tracing::debug!(
            collection,
            count = records.len(),
            "cloud: listed pocketbase records"
        );
        Ok(records)
    }

    async fn create(
        &self,
        collection: &str,
        payload: &serde_json::Value,
    ) -> CpdResult<RemoteRecord> {
        if !self.is_configured() {
            return Err(RemoteError::NotConfigured.into());
        }
        let url = self.records_url(collection);
        let body = self
            .transport
            .execute(collection, |client| {
                let mut req = client.post(&url).json(payload);
                if let Some(token) = self.auth_header() {
                    req = req.header("Authorization", token);
                }
                req
            })
            .await?;
        Ok(self.to_record(body)?)
    }

    async fn update(
        &self,
        collection: &str,
        remote_id: &str,
        payload: &serde_json::Value,
    ) -> CpdResult<RemoteRecord> {
        if !self.is_configured() {
            return Err(RemoteError::NotConfigured.into());
        }
        let url = format!("{}/{remote_id}", self.records_url(collection));
        let body = self
            .transport
            .execute(collection, |client| {
                let mut req = client.patch(&url).json(payload);
                if let Some(token) = self.auth_header() {
                    req = req.header("Authorization", token);
                }
                req
            })
            .await?;
        Ok(self.to_record(body)?)
    }
}
