//! Tombstones for locally deleted records that exist remotely.

use rusqlite::{params, Connection};

use cpd_core::errors::CpdResult;

use crate::to_storage_err;

pub fn insert_tombstone(conn: &Connection, collection: &str, remote_id: &str) -> CpdResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO sync_tombstones (remote_id, collection) VALUES (?1, ?2)",
        params![remote_id, collection],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Whether a downloaded record was deleted locally and must be skipped.
pub fn is_tombstoned(conn: &Connection, collection: &str, remote_id: &str) -> CpdResult<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sync_tombstones WHERE remote_id = ?1 AND collection = ?2",
            params![remote_id, collection],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count > 0)
}
