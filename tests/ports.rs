// ABOUTME: Integration tests for port definitions, ranges and port bindings.
// ABOUTME: Exercises the public port helpers and the ports/port_bindings fields.

use berth::translate::{Container, ErrorKind, RawInput, TranslateOptions, translate_input};
use berth::types::{PortDef, PortError, Protocol, get_port_def, get_port_range};
use serde_json::{Value, json};

fn raw(value: Value) -> RawInput {
    match value {
        Value::Object(map) => map,
        _ => panic!("test input must be an object"),
    }
}

fn rendered(value: Value) -> Value {
    serde_json::to_value(
        translate_input(Container, raw(value), &TranslateOptions::new()).unwrap(),
    )
    .unwrap()
}

mod helpers {
    use super::*;

    #[test]
    fn port_def_defaults_to_tcp() {
        assert_eq!(get_port_def("80", None).unwrap(), PortDef::tcp(80));
        assert_eq!(
            get_port_def("53", Some(Protocol::Udp)).unwrap(),
            PortDef::udp(53)
        );
    }

    #[test]
    fn suffix_wins_over_protocol_argument() {
        assert_eq!(
            get_port_def("2222/udp", Some(Protocol::Tcp)).unwrap(),
            PortDef::udp(2222)
        );
    }

    #[test]
    fn port_def_serializes_by_protocol() {
        assert_eq!(serde_json::to_value(PortDef::tcp(80)).unwrap(), json!(80));
        assert_eq!(
            serde_json::to_value(PortDef::udp(53)).unwrap(),
            json!([53, "udp"])
        );
    }

    #[test]
    fn range_order_is_checked() {
        let range = get_port_range("2222-2223").unwrap();
        assert_eq!((range.start(), range.end()), (2222, 2223));

        let err = get_port_range("2222-2221").unwrap_err();
        assert_eq!(err, PortError::RangeOrder { start: 2222, end: 2221 });
    }

    #[test]
    fn non_numeric_ports_are_rejected() {
        assert!(matches!(
            get_port_range("http").unwrap_err(),
            PortError::NonNumeric(_)
        ));
    }

    #[test]
    fn port_zero_is_rejected() {
        assert!(matches!(
            get_port_def("0", None).unwrap_err(),
            PortError::InvalidDefinition(_)
        ));
        assert!(matches!(
            get_port_range("0-5").unwrap_err(),
            PortError::NonNumeric(_)
        ));
        assert!(matches!(
            get_port_range("0").unwrap_err(),
            PortError::NonNumeric(_)
        ));
    }
}

mod ports_field {
    use super::*;

    #[test]
    fn expands_ranges_and_groups_protocols() {
        let out = rendered(json!({"ports": "1111,2222/tcp,3333/udp,4505-4506"}));
        assert_eq!(out["ports"], json!([1111, 2222, 4505, 4506, [3333, "udp"]]));
    }

    #[test]
    fn accepts_native_lists() {
        let out = rendered(json!({"expose": [80, "443", [53, "udp"]]}));
        assert_eq!(out["ports"], json!([80, 443, [53, "udp"]]));
    }

    #[test]
    fn unknown_protocol_is_rejected() {
        let err = translate_input(
            Container,
            raw(json!({"ports": "80/sctp"})),
            &TranslateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.field(), "ports");
    }
}

mod bindings {
    use super::*;

    #[test]
    fn ip_host_and_container() {
        let out = rendered(json!({"port_bindings": "10.1.2.3:8080:80"}));
        assert_eq!(out["port_bindings"], json!({"80": ["10.1.2.3", 8080]}));
        assert_eq!(out["ports"], json!([80]));
    }

    #[test]
    fn host_and_container() {
        let out = rendered(json!({"publish": "8080:80"}));
        assert_eq!(out["port_bindings"], json!({"80": 8080}));
    }

    #[test]
    fn container_only_is_ephemeral() {
        let out = rendered(json!({"publish": "80"}));
        assert_eq!(out["port_bindings"], json!({"80": null}));
    }

    #[test]
    fn ip_without_host_port() {
        let out = rendered(json!({"publish": "10.1.2.3::80"}));
        assert_eq!(out["port_bindings"], json!({"80": ["10.1.2.3"]}));
    }

    #[test]
    fn udp_bindings_keep_protocol_key() {
        let out = rendered(json!({"publish": "53:53/udp"}));
        assert_eq!(out["port_bindings"], json!({"53/udp": 53}));
        assert_eq!(out["ports"], json!([[53, "udp"]]));
    }

    #[test]
    fn matching_ranges_pair_positionally() {
        let out = rendered(json!({"publish": "8080-8081:80-81"}));
        assert_eq!(out["port_bindings"], json!({"80": 8080, "81": 8081}));
        assert_eq!(out["ports"], json!([80, 81]));
    }

    #[test]
    fn host_range_for_one_container_port() {
        let out = rendered(json!({"publish": "8080-8081:80"}));
        assert_eq!(out["port_bindings"], json!({"80": [8080, 8081]}));
    }

    #[test]
    fn repeated_container_port_collects_endpoints() {
        let out = rendered(json!({"publish": ["80", "8080:80"]}));
        assert_eq!(out["port_bindings"], json!({"80": [null, 8080]}));

        let out = rendered(json!({"port_bindings": "80,8080:80"}));
        assert_eq!(out["port_bindings"], json!({"80": [null, 8080]}));
    }

    #[test]
    fn mismatched_ranges_are_range_errors() {
        let err = translate_input(
            Container,
            raw(json!({"publish": "1111-1113:1111-1112"})),
            &TranslateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert!(err.to_string().contains("does not have the same number of ports"));
    }

    #[test]
    fn too_many_components_is_a_format_error() {
        let err = translate_input(
            Container,
            raw(json!({"publish": "1:2:3:4"})),
            &TranslateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn empty_parts_are_rejected() {
        for binding in [":80", "8080:", "10.1.2.3:8080:"] {
            let err = translate_input(
                Container,
                raw(json!({"publish": binding})),
                &TranslateOptions::new(),
            )
            .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "binding {binding}");
        }
    }

    #[test]
    fn host_ip_is_validated() {
        let err = translate_input(
            Container,
            raw(json!({"publish": "10.1.2:8080:80"})),
            &TranslateOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let lenient = TranslateOptions::new().validate_ip_addrs(false);
        assert!(
            translate_input(Container, raw(json!({"publish": "10.1.2:8080:80"})), &lenient)
                .is_ok()
        );
    }

    #[test]
    fn mapping_form_is_accepted() {
        let out = rendered(json!({"port_bindings": {"80": 8080, "53/udp": ["10.1.2.3", 53]}}));
        assert_eq!(
            out["port_bindings"],
            json!({"80": 8080, "53/udp": ["10.1.2.3", 53]})
        );
    }

    #[test]
    fn mapping_form_reads_string_host_ports() {
        let lenient = TranslateOptions::new().validate_ip_addrs(false);
        let out = translate_input(
            Container,
            raw(json!({"port_bindings": {"80": ["8080", "8081"]}})),
            &lenient,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(out).unwrap()["port_bindings"],
            json!({"80": [8080, 8081]})
        );
        assert_eq!(
            rendered(json!({"port_bindings": {"80": ["8080", "8081"]}}))["port_bindings"],
            json!({"80": [8080, 8081]})
        );
    }
}
