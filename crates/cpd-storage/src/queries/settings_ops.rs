//! The settings singleton row (id = 1, created by v001).

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use cpd_core::errors::{CpdError, CpdResult, StorageError};
use cpd_core::model::Settings;

use crate::queries::{enum_from_text, enum_to_text, parse_ts};
use crate::to_storage_err;

pub fn get_settings(conn: &Connection) -> CpdResult<Settings> {
    let raw: Option<(f64, String, String, Option<String>)> = conn
        .query_row(
            "SELECT electricity_rate, locale, default_currency, last_synced_at
             FROM settings WHERE id = 1",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    let (electricity_rate, locale, default_currency, last_synced_at) =
        raw.ok_or(CpdError::StorageError(StorageError::SettingsMissing))?;

    Ok(Settings {
        electricity_rate,
        locale,
        default_currency: enum_from_text(&default_currency)?,
        last_synced_at: last_synced_at.as_deref().map(parse_ts).transpose()?,
    })
}

pub fn update_settings(conn: &Connection, settings: &Settings) -> CpdResult<()> {
    conn.execute(
        "UPDATE settings SET electricity_rate = ?1, locale = ?2, default_currency = ?3
         WHERE id = 1",
        params![
            settings.electricity_rate,
            settings.locale,
            enum_to_text(&settings.default_currency)?,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Stamp the global "last synced" timestamp after a sync cycle.
pub fn set_last_synced_at(conn: &Connection, at: DateTime<Utc>) -> CpdResult<()> {
    conn.execute(
        "UPDATE settings SET last_synced_at = ?1 WHERE id = 1",
        params![at.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
