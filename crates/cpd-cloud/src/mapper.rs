//! Mapping between local entities and the canonical wire shape.
//!
//! The wire payload is snake_case JSON with the local id carried as
//! `local_id` (the cross-reference the download path uses to re-link a
//! record that lost its `remote_id`) and the owner under `user`
//! (adapters re-key when their backend names it differently).
//! `remote_id`, `synced`, and `last_synced_at` never travel as local
//! state; the engine derives them from the handshake.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cpd_core::errors::CpdResult;
use cpd_core::model::{
    Asset, AssetCategory, AssetRole, AssetStatus, BillingCycle, Currency, MaintenanceEntry,
    Subscription, SubscriptionCategory, SubscriptionStatus,
};

use crate::remote::RemoteRecord;

#[derive(Debug, Serialize, Deserialize)]
struct MaintenanceWire {
    date: DateTime<Utc>,
    note: String,
    cost: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct AssetWire {
    #[serde(default)]
    local_id: String,
    name: String,
    category: AssetCategory,
    purchase_date: DateTime<Utc>,
    price: f64,
    currency: Currency,
    // Backends may hand back null for an empty list column.
    #[serde(default)]
    maintenance_log: Option<Vec<MaintenanceWire>>,
    target_lifespan: i64,
    status: AssetStatus,
    #[serde(default)]
    sold_price: Option<f64>,
    #[serde(default)]
    notes: Option<String>,
    role: String,
    #[serde(default)]
    system_id: Option<String>,
    #[serde(default)]
    linked_asset_id: Option<String>,
    power_watts: f64,
    daily_usage_hours: f64,
    recurring_maintenance_cost: f64,
    #[serde(default)]
    synced: bool,
    // Adapters re-key the owner column, so it may come back absent.
    #[serde(default)]
    user: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubscriptionWire {
    #[serde(default)]
    local_id: String,
    name: String,
    billing_cycle: BillingCycle,
    cost: f64,
    currency: Currency,
    start_date: DateTime<Utc>,
    category: SubscriptionCategory,
    status: SubscriptionStatus,
    #[serde(default)]
    cancelled_date: Option<DateTime<Utc>>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    synced: bool,
    #[serde(default)]
    user: String,
}

/// Upload payload for an asset.
pub fn asset_to_remote(asset: &Asset, owner_id: &str) -> CpdResult<serde_json::Value> {
    let wire = AssetWire {
        local_id: asset.id.clone(),
        name: asset.name.clone(),
        category: asset.category,
        purchase_date: asset.purchase_date,
        price: asset.price,
        currency: asset.currency,
        maintenance_log: Some(
            asset
                .maintenance_log
                .iter()
                .map(|entry| MaintenanceWire {
                    date: entry.date,
                    note: entry.note.clone(),
                    cost: entry.cost,
                })
                .collect(),
        ),
        target_lifespan: asset.target_lifespan,
        status: asset.status,
        sold_price: asset.sold_price,
        notes: asset.notes.clone(),
        role: asset.role.tag().to_string(),
        system_id: asset.role.system_id().map(String::from),
        linked_asset_id: asset.role.linked_asset_id().map(String::from),
        power_watts: asset.power_watts,
        daily_usage_hours: asset.daily_usage_hours,
        recurring_maintenance_cost: asset.recurring_maintenance_cost,
        synced: true,
        user: owner_id.to_string(),
    };
    Ok(serde_json::to_value(wire)?)
}

/// Rebuild an asset from a downloaded record.
///
/// Local id preference: the already-linked local row, then the
/// payload's `local_id`, then a fresh uuid. The result always comes
/// back clean (`synced`, linked, stamped with the server clock).
pub fn asset_from_remote(record: &RemoteRecord, existing_local_id: Option<&str>) -> CpdResult<Asset> {
    let wire: AssetWire = serde_json::from_value(record.data.clone())?;
    let role = AssetRole::from_parts(&wire.role, wire.system_id, wire.linked_asset_id)?;
    let id = match existing_local_id {
        Some(id) => id.to_string(),
        None if !wire.local_id.is_empty() => wire.local_id,
        None => uuid::Uuid::new_v4().to_string(),
    };
    Ok(Asset {
        id,
        name: wire.name,
        category: wire.category,
        purchase_date: wire.purchase_date,
        price: wire.price,
        currency: wire.currency,
        maintenance_log: wire
            .maintenance_log
            .unwrap_or_default()
            .into_iter()
            .map(|entry| MaintenanceEntry {
                date: entry.date,
                note: entry.note,
                cost: entry.cost,
            })
            .collect(),
        target_lifespan: wire.target_lifespan,
        status: wire.status,
        sold_price: wire.sold_price,
        notes: wire.notes,
        role,
        power_watts: wire.power_watts,
        daily_usage_hours: wire.daily_usage_hours,
        recurring_maintenance_cost: wire.recurring_maintenance_cost,
        remote_id: Some(record.id.clone()),
        synced: true,
        last_synced_at: Some(record.updated_at),
    })
}

/// Upload payload for a subscription.
pub fn subscription_to_remote(sub: &Subscription, owner_id: &str) -> CpdResult<serde_json::Value> {
    let wire = SubscriptionWire {
        local_id: sub.id.clone(),
        name: sub.name.clone(),
        billing_cycle: sub.billing_cycle,
        cost: sub.cost,
        currency: sub.currency,
        start_date: sub.start_date,
        category: sub.category,
        status: sub.status,
        cancelled_date: sub.cancelled_date,
        notes: sub.notes.clone(),
        synced: true,
        user: owner_id.to_string(),
    };
    Ok(serde_json::to_value(wire)?)
}

/// Rebuild a subscription from a downloaded record.
pub fn subscription_from_remote(
    record: &RemoteRecord,
    existing_local_id: Option<&str>,
) -> CpdResult<Subscription> {
    let wire: SubscriptionWire = serde_json::from_value(record.data.clone())?;
    let id = match existing_local_id {
        Some(id) => id.to_string(),
        None if !wire.local_id.is_empty() => wire.local_id,
        None => uuid::Uuid::new_v4().to_string(),
    };
    Ok(Subscription {
        id,
        name: wire.name,
        billing_cycle: wire.billing_cycle,
        cost: wire.cost,
        currency: wire.currency,
        start_date: wire.start_date,
        category: wire.category,
        status: wire.status,
        cancelled_date: wire.cancelled_date,
        notes: wire.notes,
        remote_id: Some(record.id.clone()),
        synced: true,
        last_synced_at: Some(record.updated_at),
    })
}

/// The embedded `local_id` of a downloaded record, when present.
pub(crate) fn wire_local_id(record: &RemoteRecord) -> Option<&str> {
    record
        .data
        .get("local_id")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
}
