// ABOUTME: Integration tests for network parameter translation.
// ABOUTME: Covers addressing validation, IPAM pools, defaults and version gating.

use berth::translate::{ErrorKind, Network, RawInput, TranslateOptions, translate_input};
use berth::types::ApiVersion;
use serde_json::{Value, json};

fn raw(value: Value) -> RawInput {
    match value {
        Value::Object(map) => map,
        _ => panic!("test input must be an object"),
    }
}

fn rendered(value: Value, options: &TranslateOptions) -> Value {
    serde_json::to_value(translate_input(Network, raw(value), options).unwrap()).unwrap()
}

mod addressing {
    use super::*;

    #[test]
    fn subnet_and_gateway_are_validated() {
        let out = rendered(
            json!({"subnet": "10.0.0.0/24", "gateway": "10.0.0.1"}),
            &TranslateOptions::new(),
        );
        assert_eq!(out["subnet"], json!("10.0.0.0/24"));
        assert_eq!(out["gateway"], json!("10.0.0.1"));
    }

    #[test]
    fn invalid_subnet_names_the_value() {
        let err = translate_input(
            Network,
            raw(json!({"subnet": "10.0.0.0/99"})),
            &TranslateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("10.0.0.0/99"));
    }

    #[test]
    fn validation_can_be_disabled() {
        let options = TranslateOptions::new().validate_ip_addrs(false);
        let out = rendered(json!({"subnet": "custom", "ip_range": "also-custom"}), &options);
        assert_eq!(out["subnet"], json!("custom"));
        assert_eq!(out["iprange"], json!("also-custom"));
    }

    #[test]
    fn aux_addresses_are_validated() {
        let out = rendered(
            json!({"aux_address": "router=10.0.0.2"}),
            &TranslateOptions::new(),
        );
        assert_eq!(out["aux_addresses"], json!({"router": "10.0.0.2"}));

        let err = translate_input(
            Network,
            raw(json!({"aux_addresses": {"router": "bogus"}})),
            &TranslateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.field(), "aux_addresses");
    }
}

mod ipam {
    use super::*;

    #[test]
    fn pools_normalize_key_spellings() {
        let out = rendered(
            json!({"ipam_pools": [
                {"subnet": "10.0.0.0/24", "ip_range": "10.0.0.0/28", "gateway": "10.0.0.1",
                 "aux_address": {"host1": "10.0.0.5"}},
                {"subnet": "fd00::/64"},
            ]}),
            &TranslateOptions::new(),
        );
        assert_eq!(
            out["ipam_pools"],
            json!([
                {"subnet": "10.0.0.0/24", "iprange": "10.0.0.0/28", "gateway": "10.0.0.1",
                 "aux_addresses": {"host1": "10.0.0.5"}},
                {"subnet": "fd00::/64"},
            ])
        );
    }

    #[test]
    fn pools_must_be_a_list_of_mappings() {
        let err = translate_input(
            Network,
            raw(json!({"ipam_pools": "10.0.0.0/24"})),
            &TranslateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "ipam_pools: ipam_pools must be a list of dictionaries"
        );
    }

    #[test]
    fn pool_gateway_is_validated() {
        let err = translate_input(
            Network,
            raw(json!({"ipam_pools": [{"subnet": "10.0.0.0/24", "gateway": "nope"}]})),
            &TranslateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

mod defaults {
    use super::*;

    #[test]
    fn check_duplicate_defaults_to_true() {
        let out = rendered(json!({"driver": "bridge"}), &TranslateOptions::new());
        assert_eq!(out, json!({"driver": "bridge", "check_duplicate": true}));
    }

    #[test]
    fn explicit_check_duplicate_wins() {
        let out = rendered(json!({"check_duplicate": false}), &TranslateOptions::new());
        assert_eq!(out["check_duplicate"], json!(false));
    }

    #[test]
    fn options_alias_becomes_driver_opts() {
        let out = rendered(
            json!({"options": "com.docker.network.bridge.name=br0"}),
            &TranslateOptions::new(),
        );
        assert_eq!(
            out["driver_opts"],
            json!({"com.docker.network.bridge.name": "br0"})
        );
    }
}

mod versions {
    use super::*;

    #[test]
    fn fields_newer_than_declared_version_fail() {
        let options = TranslateOptions::new().api_version(ApiVersion::new(1, 28));
        let err = translate_input(Network, raw(json!({"ingress": true})), &options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VersionGate);
        assert_eq!(err.field(), "ingress");
    }

    #[test]
    fn no_declared_version_accepts_everything() {
        let out = rendered(json!({"scope": "swarm", "ingress": true}), &TranslateOptions::new());
        assert_eq!(out["scope"], json!("swarm"));
    }
}
