//! CRUD query modules. Each function takes a `&Connection` and stays
//! oblivious to locking; the `Database` wrapper owns the mutex.

pub mod asset_ops;
pub mod settings_ops;
pub mod subscription_ops;
pub mod tombstone_ops;

use chrono::{DateTime, Utc};

use cpd_core::errors::CpdResult;

use crate::to_storage_err;

/// Serialize an enum to its bare variant text for a TEXT column.
pub(crate) fn enum_to_text<T: serde::Serialize>(value: &T) -> CpdResult<String> {
    Ok(serde_json::to_string(value)?.trim_matches('"').to_string())
}

/// Parse a TEXT column back into an enum variant.
pub(crate) fn enum_from_text<T: serde::de::DeserializeOwned>(text: &str) -> CpdResult<T> {
    Ok(serde_json::from_str(&format!("\"{text}\""))?)
}

/// Parse an RFC 3339 TEXT column into a UTC timestamp.
pub(crate) fn parse_ts(text: &str) -> CpdResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| to_storage_err(format!("bad timestamp '{text}': {e}")))
}
