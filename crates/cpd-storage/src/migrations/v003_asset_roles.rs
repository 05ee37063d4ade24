//! v003: explicit asset roles.
//!
//! Adds `role` / `system_id` / `linked_asset_id` and back-fills from
//! the deprecated columns: composite rows become systems (composite
//! wins if a row somehow carried both flags), rows with a parent become
//! components of that parent, everything else stays standalone.

use rusqlite::Connection;

use cpd_core::errors::CpdResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CpdResult<()> {
    conn.execute_batch(
        "
        ALTER TABLE assets ADD COLUMN role TEXT NOT NULL DEFAULT 'Standalone';
        ALTER TABLE assets ADD COLUMN system_id TEXT;
        ALTER TABLE assets ADD COLUMN linked_asset_id TEXT;

        UPDATE assets SET role = 'System'
            WHERE is_composite = 1;
        UPDATE assets SET role = 'Component', system_id = parent_id
            WHERE parent_id IS NOT NULL AND role = 'Standalone';

        CREATE INDEX IF NOT EXISTS idx_assets_system_id ON assets(system_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
