//! Insert, update, get, sync-bookkeeping ops for assets.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use cpd_core::errors::{CpdError, CpdResult};
use cpd_core::model::{Asset, AssetRole, AssetStatus};

use crate::queries::{enum_from_text, enum_to_text, parse_ts};
use crate::to_storage_err;

const ASSET_COLUMNS: &str = "id, name, category, purchase_date, price, currency, \
     maintenance_log, target_lifespan, status, sold_price, notes, \
     power_watts, daily_usage_hours, recurring_maintenance_cost, \
     role, system_id, linked_asset_id, remote_id, synced, last_synced_at";

/// Raw column values, converted into the domain type outside the
/// rusqlite row closure.
struct RawAsset {
    id: String,
    name: String,
    category: String,
    purchase_date: String,
    price: f64,
    currency: String,
    maintenance_log: String,
    target_lifespan: i64,
    status: String,
    sold_price: Option<f64>,
    notes: Option<String>,
    power_watts: f64,
    daily_usage_hours: f64,
    recurring_maintenance_cost: f64,
    role: String,
    system_id: Option<String>,
    linked_asset_id: Option<String>,
    remote_id: Option<String>,
    synced: bool,
    last_synced_at: Option<String>,
}

fn read_raw(row: &Row<'_>) -> rusqlite::Result<RawAsset> {
    Ok(RawAsset {
        id: row.get(0)?,
        name: row.get(1)?,
        category: row.get(2)?,
        purchase_date: row.get(3)?,
        price: row.get(4)?,
        currency: row.get(5)?,
        maintenance_log: row.get(6)?,
        target_lifespan: row.get(7)?,
        status: row.get(8)?,
        sold_price: row.get(9)?,
        notes: row.get(10)?,
        power_watts: row.get(11)?,
        daily_usage_hours: row.get(12)?,
        recurring_maintenance_cost: row.get(13)?,
        role: row.get(14)?,
        system_id: row.get(15)?,
        linked_asset_id: row.get(16)?,
        remote_id: row.get(17)?,
        synced: row.get(18)?,
        last_synced_at: row.get(19)?,
    })
}

impl RawAsset {
    fn into_asset(self) -> CpdResult<Asset> {
        Ok(Asset {
            id: self.id,
            name: self.name,
            category: enum_from_text(&self.category)?,
            purchase_date: parse_ts(&self.purchase_date)?,
            price: self.price,
            currency: enum_from_text(&self.currency)?,
            maintenance_log: serde_json::from_str(&self.maintenance_log)?,
            target_lifespan: self.target_lifespan,
            status: enum_from_text(&self.status)?,
            sold_price: self.sold_price,
            notes: self.notes,
            role: AssetRole::from_parts(&self.role, self.system_id, self.linked_asset_id)?,
            power_watts: self.power_watts,
            daily_usage_hours: self.daily_usage_hours,
            recurring_maintenance_cost: self.recurring_maintenance_cost,
            remote_id: self.remote_id,
            synced: self.synced,
            last_synced_at: self.last_synced_at.as_deref().map(parse_ts).transpose()?,
        })
    }
}

pub fn insert_asset(conn: &Connection, asset: &Asset) -> CpdResult<()> {
    conn.execute(
        "INSERT INTO assets (
            id, name, category, purchase_date, price, currency,
            maintenance_log, target_lifespan, status, sold_price, notes,
            power_watts, daily_usage_hours, recurring_maintenance_cost,
            role, system_id, linked_asset_id, remote_id, synced, last_synced_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
        )",
        params![
            asset.id,
            asset.name,
            enum_to_text(&asset.category)?,
            asset.purchase_date.to_rfc3339(),
            asset.price,
            enum_to_text(&asset.currency)?,
            serde_json::to_string(&asset.maintenance_log)?,
            asset.target_lifespan,
            enum_to_text(&asset.status)?,
            asset.sold_price,
            asset.notes,
            asset.power_watts,
            asset.daily_usage_hours,
            asset.recurring_maintenance_cost,
            asset.role.tag(),
            asset.role.system_id(),
            asset.role.linked_asset_id(),
            asset.remote_id,
            asset.synced as i32,
            asset.last_synced_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_asset(conn: &Connection, id: &str) -> CpdResult<Option<Asset>> {
    let raw = conn
        .query_row(
            &format!("SELECT {ASSET_COLUMNS} FROM assets WHERE id = ?1"),
            params![id],
            read_raw,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawAsset::into_asset).transpose()
}

pub fn get_all_assets(conn: &Connection) -> CpdResult<Vec<Asset>> {
    collect_assets(conn, &format!("SELECT {ASSET_COLUMNS} FROM assets ORDER BY purchase_date DESC"), params![])
}

pub fn assets_by_status(conn: &Connection, status: AssetStatus) -> CpdResult<Vec<Asset>> {
    collect_assets(
        conn,
        &format!("SELECT {ASSET_COLUMNS} FROM assets WHERE status = ?1 ORDER BY purchase_date DESC"),
        params![enum_to_text(&status)?],
    )
}

/// Records the next upload cycle must push.
pub fn find_unsynced(conn: &Connection) -> CpdResult<Vec<Asset>> {
    collect_assets(
        conn,
        &format!("SELECT {ASSET_COLUMNS} FROM assets WHERE synced = 0"),
        params![],
    )
}

pub fn count_unsynced(conn: &Connection) -> CpdResult<usize> {
    conn.query_row("SELECT COUNT(*) FROM assets WHERE synced = 0", [], |row| {
        row.get::<_, i64>(0)
    })
    .map(|n| n as usize)
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn find_by_remote_id(conn: &Connection, remote_id: &str) -> CpdResult<Option<Asset>> {
    let raw = conn
        .query_row(
            &format!("SELECT {ASSET_COLUMNS} FROM assets WHERE remote_id = ?1"),
            params![remote_id],
            read_raw,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawAsset::into_asset).transpose()
}

fn collect_assets(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> CpdResult<Vec<Asset>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, read_raw)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut assets = Vec::new();
    for raw in rows {
        let raw = raw.map_err(|e| to_storage_err(e.to_string()))?;
        assets.push(raw.into_asset()?);
    }
    Ok(assets)
}

/// Content update from the application. Always resets `synced` to 0 so
/// the row is picked up by the next upload; never touches `remote_id`
/// or `last_synced_at`. Errors when the row does not exist.
pub fn update_asset(conn: &Connection, asset: &Asset) -> CpdResult<()> {
    let changed = conn.execute(
        "UPDATE assets SET
            name = ?2, category = ?3, purchase_date = ?4, price = ?5,
            currency = ?6, maintenance_log = ?7, target_lifespan = ?8,
            status = ?9, sold_price = ?10, notes = ?11, power_watts = ?12,
            daily_usage_hours = ?13, recurring_maintenance_cost = ?14,
            role = ?15, system_id = ?16, linked_asset_id = ?17,
            synced = 0
        WHERE id = ?1",
        params![
            asset.id,
            asset.name,
            enum_to_text(&asset.category)?,
            asset.purchase_date.to_rfc3339(),
            asset.price,
            enum_to_text(&asset.currency)?,
            serde_json::to_string(&asset.maintenance_log)?,
            asset.target_lifespan,
            enum_to_text(&asset.status)?,
            asset.sold_price,
            asset.notes,
            asset.power_watts,
            asset.daily_usage_hours,
            asset.recurring_maintenance_cost,
            asset.role.tag(),
            asset.role.system_id(),
            asset.role.linked_asset_id(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    if changed == 0 {
        return Err(CpdError::AssetNotFound {
            id: asset.id.clone(),
        });
    }
    Ok(())
}

/// Engine-only write of a downloaded record: whole row, `synced = 1`.
pub fn apply_remote(conn: &Connection, asset: &Asset) -> CpdResult<()> {
    conn.execute(
        "INSERT INTO assets (
            id, name, category, purchase_date, price, currency,
            maintenance_log, target_lifespan, status, sold_price, notes,
            power_watts, daily_usage_hours, recurring_maintenance_cost,
            role, system_id, linked_asset_id, remote_id, synced, last_synced_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, 1, ?19
        )
        ON CONFLICT(id) DO UPDATE SET
            name = excluded.name, category = excluded.category,
            purchase_date = excluded.purchase_date, price = excluded.price,
            currency = excluded.currency,
            maintenance_log = excluded.maintenance_log,
            target_lifespan = excluded.target_lifespan,
            status = excluded.status, sold_price = excluded.sold_price,
            notes = excluded.notes, power_watts = excluded.power_watts,
            daily_usage_hours = excluded.daily_usage_hours,
            recurring_maintenance_cost = excluded.recurring_maintenance_cost,
            role = excluded.role, system_id = excluded.system_id,
            linked_asset_id = excluded.linked_asset_id,
            remote_id = excluded.remote_id,
            synced = 1, last_synced_at = excluded.last_synced_at",
        params![
            asset.id,
            asset.name,
            enum_to_text(&asset.category)?,
            asset.purchase_date.to_rfc3339(),
            asset.price,
            enum_to_text(&asset.currency)?,
            serde_json::to_string(&asset.maintenance_log)?,
            asset.target_lifespan,
            enum_to_text(&asset.status)?,
            asset.sold_price,
            asset.notes,
            asset.power_watts,
            asset.daily_usage_hours,
            asset.recurring_maintenance_cost,
            asset.role.tag(),
            asset.role.system_id(),
            asset.role.linked_asset_id(),
            asset.remote_id,
            asset.last_synced_at.map(|t| t.to_rfc3339()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// After a successful upload: record the remote linkage, clear the
/// dirty flag, stamp the handshake time.
pub fn mark_synced(
    conn: &Connection,
    id: &str,
    remote_id: &str,
    at: DateTime<Utc>,
) -> CpdResult<()> {
    conn.execute(
        "UPDATE assets SET remote_id = ?2, synced = 1, last_synced_at = ?3 WHERE id = ?1",
        params![id, remote_id, at.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Delete an asset, leaving a tombstone when it was ever uploaded.
pub fn delete_asset(conn: &Connection, id: &str) -> CpdResult<()> {
    let remote_id: Option<Option<String>> = conn
        .query_row(
            "SELECT remote_id FROM assets WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    if let Some(Some(remote_id)) = remote_id {
        crate::queries::tombstone_ops::insert_tombstone(conn, "assets", &remote_id)?;
    }
    conn.execute("DELETE FROM assets WHERE id = ?1", params![id])
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Replace every asset row inside the caller's transaction (import).
pub fn replace_all(conn: &Connection, assets: &[Asset]) -> CpdResult<()> {
    conn.execute("DELETE FROM assets", [])
        .map_err(|e| to_storage_err(e.to_string()))?;
    for asset in assets {
        insert_asset(conn, asset)?;
    }
    Ok(())
}
