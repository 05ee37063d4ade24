//! Versioned schema migrations, recorded in a `schema_version` table.
//!
//! Each version runs exactly once, in ascending order, inside its own
//! transaction. Re-running against an up-to-date database is a no-op.

pub mod v001_initial;
pub mod v002_sync_columns;
pub mod v003_asset_roles;
pub mod v004_tombstones;

use rusqlite::Connection;

use cpd_core::errors::{CpdError, CpdResult, StorageError};

use crate::to_storage_err;

type Migration = fn(&Connection) -> CpdResult<()>;

const MIGRATIONS: &[(u32, Migration)] = &[
    (1, v001_initial::migrate),
    (2, v002_sync_columns::migrate),
    (3, v003_asset_roles::migrate),
    (4, v004_tombstones::migrate),
];

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> CpdResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;

    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        let tx = conn
            .unchecked_transaction()
            .map_err(|e| migration_err(*version, e.to_string()))?;
        migrate(&tx).map_err(|e| migration_err(*version, e.to_string()))?;
        tx.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| migration_err(*version, e.to_string()))?;
        tx.commit()
            .map_err(|e| migration_err(*version, e.to_string()))?;
        tracing::info!(version = version, "applied migration");
    }

    Ok(())
}

/// Highest applied schema version (0 for a fresh database).
pub fn current_version(conn: &Connection) -> CpdResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}

fn migration_err(version: u32, reason: String) -> CpdError {
    CpdError::StorageError(StorageError::MigrationFailed { version, reason })
}
