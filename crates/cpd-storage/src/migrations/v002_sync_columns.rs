//! v002: per-record sync bookkeeping plus the global last-synced stamp.

use rusqlite::Connection;

use cpd_core::errors::CpdResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CpdResult<()> {
    conn.execute_batch(
        "
        ALTER TABLE assets ADD COLUMN remote_id TEXT;
        ALTER TABLE assets ADD COLUMN synced INTEGER NOT NULL DEFAULT 0;
        ALTER TABLE assets ADD COLUMN last_synced_at TEXT;

        ALTER TABLE subscriptions ADD COLUMN remote_id TEXT;
        ALTER TABLE subscriptions ADD COLUMN synced INTEGER NOT NULL DEFAULT 0;
        ALTER TABLE subscriptions ADD COLUMN last_synced_at TEXT;

        ALTER TABLE settings ADD COLUMN last_synced_at TEXT;

        CREATE INDEX IF NOT EXISTS idx_assets_remote_id        ON assets(remote_id);
        CREATE INDEX IF NOT EXISTS idx_assets_synced            ON assets(synced);
        CREATE INDEX IF NOT EXISTS idx_subscriptions_remote_id ON subscriptions(remote_id);
        CREATE INDEX IF NOT EXISTS idx_subscriptions_synced     ON subscriptions(synced);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
