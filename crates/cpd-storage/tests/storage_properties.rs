//! Property tests: arbitrary records survive a trip through SQLite.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use cpd_core::model::*;
use cpd_storage::Database;

fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    // 2015-01-01 .. ~2033, whole seconds plus millis.
    (1_420_070_400i64..2_000_000_000, 0u32..1000).prop_map(|(secs, millis)| {
        Utc.timestamp_opt(secs, millis * 1_000_000).unwrap()
    })
}

fn arb_category() -> impl Strategy<Value = AssetCategory> {
    prop_oneof![
        Just(AssetCategory::Tech),
        Just(AssetCategory::Music),
        Just(AssetCategory::Life),
        Just(AssetCategory::Others),
    ]
}

fn arb_status() -> impl Strategy<Value = AssetStatus> {
    prop_oneof![
        Just(AssetStatus::Active),
        Just(AssetStatus::Sold),
        Just(AssetStatus::Retired),
    ]
}

fn arb_role() -> impl Strategy<Value = AssetRole> {
    prop_oneof![
        Just(AssetRole::Standalone),
        Just(AssetRole::System),
        "[a-f0-9]{8}".prop_map(|id| AssetRole::Component { system_id: id }),
        proptest::option::of("[a-f0-9]{8}")
            .prop_map(|id| AssetRole::Accessory { linked_asset_id: id }),
    ]
}

fn arb_maintenance() -> impl Strategy<Value = Vec<MaintenanceEntry>> {
    proptest::collection::vec(
        (arb_timestamp(), "[a-z ]{0,20}", 0.0f64..100_000.0).prop_map(|(date, note, cost)| {
            MaintenanceEntry { date, note, cost }
        }),
        0..4,
    )
}

prop_compose! {
    fn arb_asset()(
        name in "[a-zA-Z0-9 ]{1,24}",
        category in arb_category(),
        purchase_date in arb_timestamp(),
        price in 0.0f64..10_000_000.0,
        maintenance_log in arb_maintenance(),
        target_lifespan in 1i64..10_000,
        status in arb_status(),
        sold_price in proptest::option::of(0.0f64..1_000_000.0),
        notes in proptest::option::of("[a-z ]{0,40}"),
        role in arb_role(),
        power_watts in 0.0f64..3_000.0,
        daily_usage_hours in 0.0f64..24.0,
        recurring_maintenance_cost in 0.0f64..100_000.0,
    ) -> Asset {
        let mut asset = Asset::new(name, category, price);
        asset.purchase_date = purchase_date;
        asset.maintenance_log = maintenance_log;
        asset.target_lifespan = target_lifespan;
        asset.status = status;
        asset.sold_price = sold_price;
        asset.notes = notes;
        asset.role = role;
        asset.power_watts = power_watts;
        asset.daily_usage_hours = daily_usage_hours;
        asset.recurring_maintenance_cost = recurring_maintenance_cost;
        asset
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn asset_insert_get_round_trips(asset in arb_asset()) {
        let db = Database::open_in_memory().unwrap();
        db.add_asset(&asset).unwrap();
        let got = db.get_asset(&asset.id).unwrap().unwrap();
        prop_assert_eq!(got, asset);
    }

    #[test]
    fn update_preserves_content_and_marks_dirty(mut asset in arb_asset()) {
        let db = Database::open_in_memory().unwrap();
        db.add_asset(&asset).unwrap();
        db.mark_asset_synced(&asset.id, "remote-x", Utc::now()).unwrap();

        asset.price += 1.0;
        db.update_asset(&asset).unwrap();

        let got = db.get_asset(&asset.id).unwrap().unwrap();
        prop_assert_eq!(got.price, asset.price);
        prop_assert!(!got.synced);
    }
}
