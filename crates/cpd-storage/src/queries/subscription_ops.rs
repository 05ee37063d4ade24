//! Insert, update, get, sync-bookkeeping ops for subscriptions.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use cpd_core::errors::{CpdError, CpdResult};
use cpd_core::model::{Subscription, SubscriptionStatus};

use crate::queries::{enum_from_text, enum_to_text, parse_ts};
use crate::to_storage_err;

const SUB_COLUMNS: &str = "id, name, billing_cycle, cost, currency, start_date, \
     category, status, cancelled_date, notes, remote_id, synced, last_synced_at";

struct RawSubscription {
    id: String,
    name: String,
    billing_cycle: String,
    cost: f64,
    currency: String,
    start_date: String,
    category: String,
    status: String,
    cancelled_date: Option<String>,
    notes: Option<String>,
    remote_id: Option<String>,
    synced: bool,
    last_synced_at: Option<String>,
}

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawSubscription> {
    Ok(RawSubscription {
        id: row.get(0)?,
        name: row.get(1)?,
        billing_cycle: row.get(2)?,
        cost: row.get(3)?,
        currency: row.get(4)?,
        start_date: row.get(5)?,
        category: row.get(6)?,
        status: row.get(7)?,
        cancelled_date: row.get(8)?,
        notes: row.get(9)?,
        remote_id: row.get(10)?,
        synced: row.get(11)?,
        last_synced_at: row.get(12)?,
    })
}

impl RawSubscription {
    fn into_subscription(self) -> CpdResult<Subscription> {
        Ok(Subscription {
            id: self.id,
            name: self.name,
            billing_cycle: enum_from_text(&self.billing_cycle)?,
            cost: self.cost,
            currency: enum_from_text(&self.currency)?,
            start_date: parse_ts(&self.start_date)?,
            category: enum_from_text(&self.category)?,
            status: enum_from_text(&self.status)?,
            cancelled_date: self.cancelled_date.as_deref().map(parse_ts).transpose()?,
            notes: self.notes,
            remote_id: self.remote_id,
            synced: self.synced,
            last_synced_at: self.last_synced_at.as_deref().map(parse_ts).transpose()?,
        })
    }
}

pub fn insert_subscription(conn: &Connection, sub: &Subscription) -> CpdResult<()> {
    conn.execute(
        "INSERT INTO subscriptions (
            id, name, billing_cycle, cost, currency, start_date,
            category, status, cancelled_date, notes,
            remote_id, synced, last_synced_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            sub.id,
            sub.name,
            enum_to_text(&sub.billing_cycle)?,
            sub.cost,
            enum_to_text(&sub.currency)?,
            sub.start_date.to_rfc3339(),
            enum_to_text(&sub.category)?,
            enum_to_text(&sub.status)?,
            sub.cancelled_date.map(|t| t.to_rfc3339()),
            sub.notes,
            sub.remote_id,
            sub.synced as i32,
            sub.last_synced_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_subscription(conn: &Connection, id: &str) -> CpdResult<Option<Subscription>> {
    let raw = conn
        .query_row(
            &format!("SELECT {SUB_COLUMNS} FROM subscriptions WHERE id = ?1"),
            params![id],
            read_raw,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawSubscription::into_subscription).transpose()
}

pub fn get_all_subscriptions(conn: &Connection) -> CpdResult<Vec<Subscription>> {
    collect_subscriptions(
        conn,
        &format!("SELECT {SUB_COLUMNS} FROM subscriptions ORDER BY start_date DESC"),
        params![],
    )
}

pub fn subscriptions_by_status(
    conn: &Connection,
    status: SubscriptionStatus,
) -> CpdResult<Vec<Subscription>> {
    collect_subscriptions(
        conn,
        &format!("SELECT {SUB_COLUMNS} FROM subscriptions WHERE status = ?1 ORDER BY start_date DESC"),
        params![enum_to_text(&status)?],
    )
}

pub fn find_unsynced(conn: &Connection) -> CpdResult<Vec<Subscription>> {
    collect_subscriptions(
        conn,
        &format!("SELECT {SUB_COLUMNS} FROM subscriptions WHERE synced = 0"),
        params![],
    )
}

pub fn count_unsynced(conn: &Connection) -> CpdResult<usize> {
    conn.query_row(
        "SELECT COUNT(*) FROM subscriptions WHERE synced = 0",
        [],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n as usize)
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn find_by_remote_id(conn: &Connection, remote_id: &str) -> CpdResult<Option<Subscription>> {
    let raw = conn
        .query_row(
            &format!("SELECT {SUB_COLUMNS} FROM subscriptions WHERE remote_id = ?1"),
            params![remote_id],
            read_raw,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawSubscription::into_subscription).transpose()
}

fn collect_subscriptions(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> CpdResult<Vec<Subscription>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, read_raw)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut subs = Vec::new();
    for raw in rows {
        let raw = raw.map_err(|e| to_storage_err(e.to_string()))?;
        subs.push(raw.into_subscription()?);
    }
    Ok(subs)
}

/// Content update from the application. Always resets `synced` to 0.
/// Errors when the row does not exist.
pub fn update_subscription(conn: &Connection, sub: &Subscription) -> CpdResult<()> {
    let changed = conn.execute(
        "UPDATE subscriptions SET
            name = ?2, billing_cycle = ?3, cost = ?4, currency = ?5,
            start_date = ?6, category = ?7, status = ?8,
            cancelled_date = ?9, notes = ?10, synced = 0
        WHERE id = ?1",
        params![
            sub.id,
            sub.name,
            enum_to_text(&sub.billing_cycle)?,
            sub.cost,
            enum_to_text(&sub.currency)?,
            sub.start_date.to_rfc3339(),
            enum_to_text(&sub.category)?,
            enum_to_text(&sub.status)?,
            sub.cancelled_date.map(|t| t.to_rfc3339()),
            sub.notes,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(CpdError::SubscriptionNotFound { id: sub.id.clone() });
    }
    Ok(())
}

/// Engine-only write of a downloaded record: whole row, `synced = 1`.
pub fn apply_remote(conn: &Connection, sub: &Subscription) -> CpdResult<()> {
    conn.execute(
        "INSERT INTO subscriptions (
            id, name, billing_cycle, cost, currency, start_date,
            category, status, cancelled_date, notes,
            remote_id, synced, last_synced_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1, ?12)
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name, billing_cycle = excluded.billing_cycle,
            cost = excluded.cost, currency = excluded.currency,
            start_date = excluded.start_date, category = excluded.category,
            status = excluded.status,
            cancelled_date = excluded.cancelled_date, notes = excluded.notes,
            remote_id = excluded.remote_id,
            synced = 1, last_synced_at = excluded.last_synced_at",
        params![
            sub.id,
            sub.name,
            enum_to_text(&sub.billing_cycle)?,
            sub.cost,
            enum_to_text(&sub.currency)?,
            sub.start_date.to_rfc3339(),
            enum_to_text(&sub.category)?,
            enum_to_text(&sub.status)?,
            sub.cancelled_date.map(|t| t.to_rfc3339()),
            sub.notes,
            sub.remote_id,
            sub.last_synced_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn mark_synced(
    conn: &Connection,
    id: &str,
    remote_id: &str,
    at: DateTime<Utc>,
) -> CpdResult<()> {
    conn.execute(
        "UPDATE subscriptions SET remote_id = ?2, synced = 1, last_synced_at = ?3 WHERE id = ?1",
        params![id, remote_id, at.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Delete a subscription, leaving a tombstone when it was uploaded.
pub fn delete_subscription(conn: &Connection, id: &str) -> CpdResult<()> {
    let remote_id: Option<Option<String>> = conn
        .query_row(
            "SELECT remote_id FROM subscriptions WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    if let Some(Some(remote_id)) = remote_id {
        crate::queries::tombstone_ops::insert_tombstone(conn, "subscriptions", &remote_id)?;
    }
    conn.execute("DELETE FROM subscriptions WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Replace every subscription row inside the caller's transaction.
pub fn replace_all(conn: &Connection, subs: &[Subscription]) -> CpdResult<()> {
    conn.execute("DELETE FROM subscriptions", [])
        .map_err(|e| to_storage_err(e.to_string()))?;
    for sub in subs {
        insert_subscription(conn, sub)?;
    }
    Ok(())
}
