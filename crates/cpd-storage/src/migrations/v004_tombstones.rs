//! v004: tombstones for locally deleted records that were uploaded.
//!
//! The remote contract has no delete, so a download would otherwise
//! re-insert anything the user removed locally. Deletes of records
//! with a `remote_id` leave a row here; the download loop skips ids it
//! finds in this table.

use rusqlite::Connection;

use cpd_core::errors::CpdResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CpdResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sync_tombstones (
            remote_id   TEXT NOT NULL,
            collection  TEXT NOT NULL,
            deleted_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            PRIMARY KEY (remote_id, collection)
        );
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
