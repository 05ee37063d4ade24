//! v001: assets, subscriptions, settings singleton.
//!
//! Carries the deprecated `parent_id` / `is_composite` pair so existing
//! databases migrate cleanly; v003 replaces them with the role columns.

use rusqlite::Connection;

use cpd_core::errors::CpdResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CpdResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS assets (
            id                          TEXT PRIMARY KEY,
            name                        TEXT NOT NULL,
            category                    TEXT NOT NULL,
            purchase_date               TEXT NOT NULL,
            price                       REAL NOT NULL,
            currency                    TEXT NOT NULL DEFAULT 'TWD',
            maintenance_log             TEXT NOT NULL DEFAULT '[]',
            target_lifespan             INTEGER NOT NULL DEFAULT 365,
            status                      TEXT NOT NULL DEFAULT 'Active',
            sold_price                  REAL,
            notes                       TEXT,
            power_watts                 REAL NOT NULL DEFAULT 0,
            daily_usage_hours           REAL NOT NULL DEFAULT 0,
            recurring_maintenance_cost  REAL NOT NULL DEFAULT 0,
            parent_id                   TEXT,
            is_composite                INTEGER NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_assets_status   ON assets(status);
        CREATE INDEX IF NOT EXISTS idx_assets_category ON assets(category);

        CREATE TABLE IF NOT EXISTS subscriptions (
            id              TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            billing_cycle   TEXT NOT NULL,
            cost            REAL NOT NULL,
            currency        TEXT NOT NULL DEFAULT 'TWD',
            start_date      TEXT NOT NULL,
            category        TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'Active',
            cancelled_date  TEXT,
            notes           TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_subscriptions_status ON subscriptions(status);

        CREATE TABLE IF NOT EXISTS settings (
            id                INTEGER PRIMARY KEY CHECK (id = 1),
            electricity_rate  REAL NOT NULL DEFAULT 4.0,
            locale            TEXT NOT NULL DEFAULT 'zh-TW',
            default_currency  TEXT NOT NULL DEFAULT 'TWD'
        );

        INSERT OR IGNORE INTO settings (id) VALUES (1);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
