//! Recurring subscriptions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::asset::Currency;

/// How often a subscription bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Yearly,
}

/// Subscription category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionCategory {
    Software,
    Service,
    Entertainment,
}

/// Lifecycle status of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionStatus {
    Active,
    Cancelled,
}

/// A recurring subscription. Sync bookkeeping fields mirror `Asset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    pub billing_cycle: BillingCycle,
    pub cost: f64,
    pub currency: Currency,
    pub start_date: DateTime<Utc>,
    pub category: SubscriptionCategory,
    pub status: SubscriptionStatus,
    pub cancelled_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,

    // Sync bookkeeping — managed by the sync engine, never by callers.
    pub remote_id: Option<String>,
    pub synced: bool,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Subscription {
    /// Create a new subscription with a fresh local id, never uploaded.
    pub fn new(name: impl Into<String>, cycle: BillingCycle, cost: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            billing_cycle: cycle,
            cost,
            currency: Currency::Twd,
            start_date: Utc::now(),
            category: SubscriptionCategory::Software,
            status: SubscriptionStatus::Active,
            cancelled_date: None,
            notes: None,
            remote_id: None,
            synced: false,
            last_synced_at: None,
        }
    }
}
