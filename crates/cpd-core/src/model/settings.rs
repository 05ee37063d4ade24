//! The settings singleton: one row, global preferences plus the
//! display-only "last synced" timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::Currency;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Electricity price per kWh.
    pub electricity_rate: f64,
    pub locale: String,
    pub default_currency: Currency,
    /// When the last sync cycle finished. Distinct from the per-record
    /// timestamps — used only to show "last synced" to the user.
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            electricity_rate: 4.0,
            locale: "zh-TW".to_string(),
            default_currency: Currency::Twd,
            last_synced_at: None,
        }
    }
}
