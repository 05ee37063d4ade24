//! PostgREST-style adapter (Supabase-compatible): tables under
//! `/rest/v1/{name}`, limit/offset pagination, `apikey` + bearer
//! headers, owner scoping through a `user_id` column.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cpd_core::config::{BackendConfig, SyncConfig};
use cpd_core::errors::{CpdResult, RemoteError};

use super::{RemoteRecord, RemoteStore, RetryTransport};

pub struct PostgrestRemote {
    config: BackendConfig,
    sync: SyncConfig,
    transport: RetryTransport,
}

impl PostgrestRemote {
    pub fn new(config: BackendConfig, sync: SyncConfig) -> CpdResult<Self> {
        let transport = RetryTransport::new(&sync)?;
        Ok(Self {
            config,
            sync,
            transport,
        })
    }

    fn table_url(&self, collection: &str) -> String {
        format!("{}/rest/v1/{collection}", self.config.base_url)
    }

    fn api_key(&self) -> &str {
        self.config.api_key.as_deref().unwrap_or_default()
    }

    /// Session token when one exists, the anon key otherwise.
    fn bearer(&self) -> &str {
        self.config
            .auth_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| self.api_key())
    }

    fn with_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", self.api_key())
            .bearer_auth(self.bearer())
    }

    /// The engine's canonical payloads carry the owner under `user`;
    /// this backend stores it in a `user_id` column.
    fn rekey_owner(payload: &serde_json::Value) -> serde_json::Value {
        let mut payload = payload.clone();
        if let Some(map) = payload.as_object_mut() {
            if let Some(owner) = map.remove("user") {
                map.insert("user_id".to_string(), owner);
            }
        }
        payload
    }

    fn to_record(item: serde_json::Value) -> Result<RemoteRecord, RemoteError> {
        let id = match item.get("id") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => {
                return Err(RemoteError::Validation {
                    reason: "row without id".to_string(),
                })
            }
        };
        let updated = item
            .get("updated_at")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RemoteError::Validation {
                reason: format!("row {id} without updated_at"),
            })?;
        let updated_at = DateTime::parse_from_rfc3339(updated)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| RemoteError::Validation {
                reason: format!("bad updated_at '{updated}': {e}"),
            })?;
        Ok(RemoteRecord {
            id,
            updated_at,
            data: item,
        })
    }

    /// Mutations return a representation array with exactly one row.
    fn single_row(body: serde_json::Value) -> Result<RemoteRecord, RemoteError> {
        match body {
            serde_json::Value::Array(mut rows) if !rows.is_empty() => {
                Self::to_record(rows.remove(0))
            }
            serde_json::Value::Object(_) => Self::to_record(body),
            _ => Err(RemoteError::Validation {
                reason: "empty representation in mutation response".to_string(),
            }),
        }
    }
}

#[async_trait]
impl RemoteStore for PostgrestRemote {
    fn backend_name(&self) -> &'static str {
        "postgrest"
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// The anon api key is enough to talk to the table API; a session
    /// token only upgrades the bearer.
    async fn is_authenticated(&self) -> bool {
        !self.api_key().is_empty()
    }

    async fn health_check(&self) -> bool {
        if !self.is_configured() {
            return false;
        }
        // No dedicated health route; a HEAD-ish query against the
        // assets table answers reachability.
        let url = self.table_url(super::ASSETS);
        let resp = self
            .with_headers(self.transport.client().get(&url))
            .query(&[("select", "id"), ("limit", "1")])
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
        let url = self.table_url(collection);
        let per_page = self.sync.page_size;
        let mut records = Vec::new();
        let mut offset: usize = 0;

        loop {
            let body = self
                .transport
                .execute(collection, |client| {
                    self.with_headers(client.get(&url)).query(&[
                        ("select", "*".to_string()),
                        ("user_id", format!("eq.{owner_id}")),
                        ("order", "updated_at.desc".to_string()),
                        ("limit", per_page.to_string()),
                        ("offset", offset.to_string()),
                    ])
                })
                .await?;

            let rows = match body {
                serde_json::Value::Array(rows) => rows,
                other => {
                    return Err(RemoteError::Validation {
                        reason: format!("unexpected list response: {other}"),
                    }
                    .into())
                }
            };
            let fetched = rows.len();
            for row in rows {
                records.push(Self::to_record(row)?);
            }
            if fetched < per_page {
                break;
            }
            offset += per_page;
        }

        tracing::debug!(
            collection,
            count = records.len(),
            "cloud: listed postgrest rows"
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
        let url = self.table_url(collection);
        let payload = Self::rekey_owner(payload);
        let body = self
            .transport
            .execute(collection, |client| {
                self.with_headers(client.post(&url))
                    .header("Prefer", "return=representation")
                    .json(&payload)
            })
            .await?;
        Ok(Self::single_row(body)?)
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
        let url = self.table_url(collection);
        let payload = Self::rekey_owner(payload);
        let body = self
            .transport
            .execute(collection, |client| {
                self.with_headers(client.patch(&url))
                    .query(&[("id", format!("eq.{remote_id}"))])
                    .header("Prefer", "return=representation")
                    .json(&payload)
            })
            .await?;
        Ok(Self::single_row(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpd_core::config::BackendKind;
    use cpd_core::errors::CpdError;
    use serde_json::json;

    fn remote_with(api_key: Option<&str>, auth_token: Option<&str>) -> PostgrestRemote {
        let config = BackendConfig {
            kind: BackendKind::Postgrest,
            base_url: "https://project.supabase.co".to_string(),
            api_key: api_key.map(str::to_string),
            auth_token: auth_token.map(str::to_string),
            owner_id: "user-1".to_string(),
        };
        PostgrestRemote::new(config, SyncConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn anon_api_key_counts_as_authenticated() {
        assert!(remote_with(Some("anon-key"), None).is_authenticated().await);
        assert!(!remote_with(None, None).is_authenticated().await);
    }

    #[tokio::test]
    async fn unconfigured_adapter_refuses_before_any_request() {
        let remote = remote_with(None, None);
        let err = remote.list_by_owner("assets", "user-1").await.unwrap_err();
        assert!(matches!(
            err,
            CpdError::RemoteError(RemoteError::NotConfigured)
        ));
    }

    #[test]
    fn owner_field_is_rekeyed_for_this_backend() {
        let payload = json!({"name": "MacBook", "user": "user-1"});
        let rekeyed = PostgrestRemote::rekey_owner(&payload);
        assert_eq!(rekeyed["user_id"], "user-1");
        assert!(rekeyed.get("user").is_none());
    }

    #[test]
    fn numeric_row_ids_become_strings() {
        let record = PostgrestRemote::to_record(json!({
            "id": 42,
            "updated_at": "2024-06-01T00:00:00Z",
            "name": "x"
        }))
        .unwrap();
        assert_eq!(record.id, "42");
    }

    #[test]
    fn mutation_representation_unwraps_the_array() {
        let record = PostgrestRemote::single_row(json!([{
            "id": "abc",
            "updated_at": "2024-06-01T00:00:00Z"
        }]))
        .unwrap();
        assert_eq!(record.id, "abc");
    }

    #[test]
    fn empty_representation_is_a_validation_error() {
        let err = PostgrestRemote::single_row(json!([])).unwrap_err();
        assert!(matches!(err, RemoteError::Validation { .. }));
    }
}
