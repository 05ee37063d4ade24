//! Physical assets: one-off purchases tracked for cost-per-day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{CpdError, CpdResult};

/// Asset category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetCategory {
    Tech,
    Music,
    Life,
    Others,
}

/// Lifecycle status of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetStatus {
    Active,
    Sold,
    Retired,
}

/// Currency of a price or cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "TWD")]
    Twd,
    #[serde(rename = "JPY")]
    Jpy,
    #[serde(rename = "USD")]
    Usd,
}

/// One maintenance event on an asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceEntry {
    pub date: DateTime<Utc>,
    pub note: String,
    pub cost: f64,
}

/// Where an asset sits in the composition hierarchy.
///
/// Replaces the earlier nullable `parent_id` / `is_composite` pair with
/// an explicit variant per role. A `Component` structurally cannot lose
/// its owning system; an `Accessory` may or may not be linked to a
/// specific asset. All assets live in one flat table and reference each
/// other by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetRole {
    /// A self-contained asset with no hierarchy.
    Standalone,
    /// A composite asset that owns components (e.g. a desktop build).
    System,
    /// A part installed inside a system (e.g. RAM inside the desktop).
    Component { system_id: String },
    /// An add-on optionally linked to another asset.
    Accessory { linked_asset_id: Option<String> },
}

impl AssetRole {
    /// Flat tag used on the wire and in the database `role` column.
    pub fn tag(&self) -> &'static str {
        match self {
            AssetRole::Standalone => "Standalone",
            AssetRole::System => "System",
            AssetRole::Component { .. } => "Component",
            AssetRole::Accessory { .. } => "Accessory",
        }
    }

    /// Owning system id, if this is a component.
    pub fn system_id(&self) -> Option<&str> {
        match self {
            AssetRole::Component { system_id } => Some(system_id),
            _ => None,
        }
    }

    /// Linked asset id, if this is an accessory with a link.
    pub fn linked_asset_id(&self) -> Option<&str> {
        match self {
            AssetRole::Accessory { linked_asset_id } => linked_asset_id.as_deref(),
            _ => None,
        }
    }

    /// Rebuild the role from its flat (tag, system_id, linked_asset_id)
    /// representation, enforcing the per-variant invariants.
    pub fn from_parts(
        tag: &str,
        system_id: Option<String>,
        linked_asset_id: Option<String>,
    ) -> CpdResult<Self> {
        match tag {
            "Standalone" => Ok(AssetRole::Standalone),
            "System" => Ok(AssetRole::System),
            "Component" => match system_id {
                Some(system_id) => Ok(AssetRole::Component { system_id }),
                None => Err(CpdError::InvalidRole {
                    reason: "component has no system_id".to_string(),
                }),
            },
            "Accessory" => Ok(AssetRole::Accessory { linked_asset_id }),
            other => Err(CpdError::InvalidRole {
                reason: format!("unknown role tag: {other}"),
            }),
        }
    }
}

impl Default for AssetRole {
    fn default() -> Self {
        AssetRole::Standalone
    }
}

/// A physical asset. `id` is the stable local primary key; `remote_id`,
/// `synced`, and `last_synced_at` are sync-engine bookkeeping, not
/// content fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub category: AssetCategory,
    pub purchase_date: DateTime<Utc>,
    pub price: f64,
    pub currency: Currency,
    pub maintenance_log: Vec<MaintenanceEntry>,
    /// Target lifespan in days.
    pub target_lifespan: i64,
    pub status: AssetStatus,
    pub sold_price: Option<f64>,
    pub notes: Option<String>,
    pub role: AssetRole,
    /// Rated power draw in watts (0 = not powered).
    pub power_watts: f64,
    pub daily_usage_hours: f64,
    /// Annualized recurring maintenance cost.
    pub recurring_maintenance_cost: f64,

    // Sync bookkeeping — managed by the sync engine, never by callers.
    pub remote_id: Option<String>,
    pub synced: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Asset {
    /// Create a new asset with a fresh local id, never uploaded.
    pub fn new(name: impl Into<String>, category: AssetCategory, price: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            category,
            purchase_date: Utc::now(),
            price,
            currency: Currency::Twd,
            maintenance_log: Vec::new(),
            target_lifespan: 365,
            status: AssetStatus::Active,
            sold_price: None,
            notes: None,
            role: AssetRole::Standalone,
            power_watts: 0.0,
            daily_usage_hours: 0.0,
            recurring_maintenance_cost: 0.0,
            remote_id: None,
            synced: false,
            last_synced_at: None,
        }
    }
}
