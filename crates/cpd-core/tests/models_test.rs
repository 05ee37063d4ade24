use cpd_core::config::{BackendConfig, BackendKind, SyncConfig};
use cpd_core::errors::CpdError;
use cpd_core::model::*;

#[test]
fn new_asset_starts_unsynced() {
    let asset = Asset::new("MacBook", AssetCategory::Tech, 45_000.0);
    assert!(!asset.synced);
    assert!(asset.remote_id.is_none());
    assert!(asset.last_synced_at.is_none());
    assert_eq!(asset.role, AssetRole::Standalone);
}

#[test]
fn new_subscription_starts_unsynced() {
    let sub = Subscription::new("Spotify", BillingCycle::Monthly, 149.0);
    assert!(!sub.synced);
    assert!(sub.remote_id.is_none());
    assert_eq!(sub.status, SubscriptionStatus::Active);
}

// --- AssetRole ---

#[test]
fn role_round_trips_through_flat_parts() {
    let roles = [
        AssetRole::Standalone,
        AssetRole::System,
        AssetRole::Component {
            system_id: "sys-1".into(),
        },
        AssetRole::Accessory {
            linked_asset_id: Some("asset-9".into()),
        },
        AssetRole::Accessory {
            linked_asset_id: None,
        },
    ];
    for role in roles {
        let rebuilt = AssetRole::from_parts(
            role.tag(),
            role.system_id().map(String::from),
            role.linked_asset_id().map(String::from),
        )
        .unwrap();
        assert_eq!(rebuilt, role);
    }
}

#[test]
fn component_without_system_id_is_rejected() {
    let err = AssetRole::from_parts("Component", None, None).unwrap_err();
    assert!(matches!(err, CpdError::InvalidRole { .. }));
}

#[test]
fn unknown_role_tag_is_rejected() {
    let err = AssetRole::from_parts("Gadget", None, None).unwrap_err();
    assert!(err.to_string().contains("Gadget"));
}

#[test]
fn accessory_link_is_optional() {
    let unlinked = AssetRole::from_parts("Accessory", None, None).unwrap();
    assert_eq!(unlinked.linked_asset_id(), None);
}

// --- serde shapes ---

#[test]
fn currency_serializes_uppercase() {
    assert_eq!(serde_json::to_string(&Currency::Twd).unwrap(), "\"TWD\"");
    assert_eq!(serde_json::to_string(&Currency::Jpy).unwrap(), "\"JPY\"");
    assert_eq!(
        serde_json::from_str::<Currency>("\"USD\"").unwrap(),
        Currency::Usd
    );
}

#[test]
fn enums_serialize_as_plain_variant_names() {
    assert_eq!(
        serde_json::to_string(&AssetCategory::Tech).unwrap(),
        "\"Tech\""
    );
    assert_eq!(
        serde_json::to_string(&BillingCycle::Quarterly).unwrap(),
        "\"Quarterly\""
    );
    assert_eq!(
        serde_json::to_string(&AssetStatus::Retired).unwrap(),
        "\"Retired\""
    );
}

// --- Settings ---

#[test]
fn settings_defaults() {
    let settings = Settings::default();
    assert_eq!(settings.electricity_rate, 4.0);
    assert_eq!(settings.locale, "zh-TW");
    assert_eq!(settings.default_currency, Currency::Twd);
    assert!(settings.last_synced_at.is_none());
}

#[test]
fn settings_deserialize_fills_missing_fields() {
    let settings: Settings = serde_json::from_str("{\"electricity_rate\": 5.5}").unwrap();
    assert_eq!(settings.electricity_rate, 5.5);
    assert_eq!(settings.locale, "zh-TW");
}

// --- config ---

#[test]
fn pocketbase_config_needs_only_a_url() {
    let config = BackendConfig {
        kind: BackendKind::PocketBase,
        base_url: "http://127.0.0.1:8090".into(),
        api_key: None,
        auth_token: Some("token".into()),
        owner_id: "user-1".into(),
    };
    assert!(config.is_configured());
}

#[test]
fn postgrest_config_needs_an_api_key() {
    let mut config = BackendConfig {
        kind: BackendKind::Postgrest,
        base_url: "https://example.supabase.co".into(),
        api_key: None,
        auth_token: None,
        owner_id: "user-1".into(),
    };
    assert!(!config.is_configured());
    config.api_key = Some("anon-key".into());
    assert!(config.is_configured());
}

#[test]
fn empty_base_url_is_not_configured() {
    let config = BackendConfig {
        kind: BackendKind::PocketBase,
        base_url: String::new(),
        api_key: None,
        auth_token: None,
        owner_id: "user-1".into(),
    };
    assert!(!config.is_configured());
}

#[test]
fn sync_config_defaults() {
    let config = SyncConfig::default();
    assert_eq!(config.interval_secs, 300);
    assert_eq!(config.page_size, 100);
    assert_eq!(config.deadline_secs, 120);
    assert_eq!(config.health_timeout_secs, 5);
}
