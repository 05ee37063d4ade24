use chrono::{TimeZone, Utc};
use serde_json::json;

use cpd_cloud::mapper::{
    asset_from_remote, asset_to_remote, subscription_from_remote, subscription_to_remote,
};
use cpd_cloud::RemoteRecord;
use cpd_core::errors::CpdError;
use cpd_core::model::*;

fn record(id: &str, data: serde_json::Value) -> RemoteRecord {
    RemoteRecord {
        id: id.to_string(),
        updated_at: Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap(),
        data,
    }
}

#[test]
fn asset_round_trips_with_millisecond_dates() {
    let mut asset = Asset::new("Camera", AssetCategory::Tech, 32_000.0);
    asset.purchase_date = Utc.timestamp_opt(1_750_000_000, 123_000_000).unwrap();
    asset.maintenance_log = vec![
        MaintenanceEntry {
            date: Utc.timestamp_opt(1_751_000_000, 500_000_000).unwrap(),
            note: "first service".into(),
            cost: 800.0,
        },
        MaintenanceEntry {
            date: Utc.timestamp_opt(1_752_000_000, 0).unwrap(),
            note: "second service".into(),
            cost: 1_200.0,
        },
    ];
    asset.notes = Some("street kit".into());
    asset.role = AssetRole::Accessory {
        linked_asset_id: Some("body-1".into()),
    };

    let payload = asset_to_remote(&asset, "user-1").unwrap();
    assert_eq!(payload["user"], "user-1");
    assert_eq!(payload["local_id"], asset.id);
    assert_eq!(payload["synced"], true);

    let restored = asset_from_remote(&record("r-1", payload), None).unwrap();
    assert_eq!(restored.id, asset.id, "local_id cross-reference restores the id");
    assert_eq!(restored.purchase_date, asset.purchase_date);
    assert_eq!(restored.maintenance_log, asset.maintenance_log);
    assert_eq!(restored.notes, asset.notes);
    assert_eq!(restored.role, asset.role);
    // Engine-managed fields come from the handshake, not the payload.
    assert_eq!(restored.remote_id.as_deref(), Some("r-1"));
    assert!(restored.synced);
    assert!(restored.last_synced_at.is_some());
}

#[test]
fn existing_local_id_wins_over_the_payload() {
    let asset = Asset::new("SSD", AssetCategory::Tech, 2_500.0);
    let payload = asset_to_remote(&asset, "user-1").unwrap();
    let restored = asset_from_remote(&record("r-2", payload), Some("local-override")).unwrap();
    assert_eq!(restored.id, "local-override");
}

#[test]
fn record_without_local_id_gets_a_fresh_one() {
    let data = json!({
        "name": "imported",
        "category": "Life",
        "purchase_date": "2026-01-01T00:00:00Z",
        "price": 100.0,
        "currency": "TWD",
        "target_lifespan": 365,
        "status": "Active",
        "role": "Standalone",
        "power_watts": 0.0,
        "daily_usage_hours": 0.0,
        "recurring_maintenance_cost": 0.0
    });
    let restored = asset_from_remote(&record("r-3", data), None).unwrap();
    assert!(!restored.id.is_empty());
}

#[test]
fn component_without_system_id_is_an_invalid_role() {
    let data = json!({
        "name": "orphan part",
        "category": "Tech",
        "purchase_date": "2026-01-01T00:00:00Z",
        "price": 100.0,
        "currency": "TWD",
        "target_lifespan": 365,
        "status": "Active",
        "role": "Component",
        "system_id": null,
        "power_watts": 0.0,
        "daily_usage_hours": 0.0,
        "recurring_maintenance_cost": 0.0
    });
    let err = asset_from_remote(&record("r-4", data), None).unwrap_err();
    assert!(matches!(err, CpdError::InvalidRole { .. }));
}

#[test]
fn subscription_round_trips() {
    let mut sub = Subscription::new("Spotify", BillingCycle::Monthly, 149.0);
    sub.category = SubscriptionCategory::Entertainment;
    sub.status = SubscriptionStatus::Cancelled;
    sub.cancelled_date = Some(Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());

    let payload = subscription_to_remote(&sub, "user-1").unwrap();
    let restored = subscription_from_remote(&record("r-5", payload), None).unwrap();
    assert_eq!(restored.id, sub.id);
    assert_eq!(restored.status, SubscriptionStatus::Cancelled);
    assert_eq!(restored.cancelled_date, sub.cancelled_date);
    assert_eq!(restored.remote_id.as_deref(), Some("r-5"));
    assert!(restored.synced);
}

#[test]
fn unknown_backend_fields_are_ignored() {
    let asset = Asset::new("NAS", AssetCategory::Tech, 15_000.0);
    let mut payload = asset_to_remote(&asset, "user-1").unwrap();
    // Server-side columns that ride along on downloads.
    payload["collectionId"] = json!("abc123");
    payload["created"] = json!("2026-01-01 00:00:00.000Z");
    let restored = asset_from_remote(&record("r-6", payload), None).unwrap();
    assert_eq!(restored.name, "NAS");
}
