//! Property tests over the role union and the cost arithmetic.

use proptest::prelude::*;

use cpd_core::costs::{daily_electricity_cost, subscription_daily_cost};
use cpd_core::model::*;

fn arb_role() -> impl Strategy<Value = AssetRole> {
    prop_oneof![
        Just(AssetRole::Standalone),
        Just(AssetRole::System),
        "[a-f0-9]{8}".prop_map(|id| AssetRole::Component { system_id: id }),
        proptest::option::of("[a-f0-9]{8}")
            .prop_map(|id| AssetRole::Accessory { linked_asset_id: id }),
    ]
}

fn arb_cycle() -> impl Strategy<Value = BillingCycle> {
    prop_oneof![
        Just(BillingCycle::Monthly),
        Just(BillingCycle::Quarterly),
        Just(BillingCycle::Yearly),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn role_survives_flat_column_parts(role in arb_role()) {
        let rebuilt = AssetRole::from_parts(
            role.tag(),
            role.system_id().map(str::to_string),
            role.linked_asset_id().map(str::to_string),
        ).unwrap();
        prop_assert_eq!(rebuilt, role);
    }

    #[test]
    fn component_parts_without_a_system_id_never_parse(
        linked in proptest::option::of("[a-f0-9]{8}"),
    ) {
        prop_assert!(AssetRole::from_parts("Component", None, linked).is_err());
    }

    #[test]
    fn electricity_cost_is_nonnegative_and_scales_with_rate(
        watts in 0.0f64..3_000.0,
        hours in 0.0f64..24.0,
        rate in 0.1f64..20.0,
    ) {
        let base = daily_electricity_cost(watts, hours, rate);
        prop_assert!(base >= 0.0);
        let doubled = daily_electricity_cost(watts, hours, rate * 2.0);
        prop_assert!((doubled - base * 2.0).abs() < 1e-9);
    }

    #[test]
    fn longer_billing_cycles_never_cost_more_per_day(
        cost in 0.0f64..100_000.0,
        cycle in arb_cycle(),
    ) {
        let mut sub = Subscription::new("svc", cycle, cost);
        let daily = subscription_daily_cost(&sub);
        sub.billing_cycle = BillingCycle::Monthly;
        let monthly_daily = subscription_daily_cost(&sub);
        prop_assert!(daily <= monthly_daily + 1e-12);
    }
}
