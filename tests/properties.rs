// ABOUTME: Property tests for translation invariants.
// ABOUTME: Idempotence, alias transparency, range symmetry and stringlist equivalence.

use berth::translate::{Container, Network, RawInput, TranslateOptions, translate_input};
use berth::types::get_port_range;
use proptest::prelude::*;
use serde_json::{Value, json};

fn single(field: &str, value: Value) -> RawInput {
    let mut input = RawInput::new();
    input.insert(field.to_string(), value);
    input
}

fn port() -> impl Strategy<Value = u16> {
    1u16..=65000
}

fn binding() -> impl Strategy<Value = String> {
    prop_oneof![
        port().prop_map(|p| p.to_string()),
        (port(), port()).prop_map(|(h, c)| format!("{h}:{c}")),
        (port(), port()).prop_map(|(h, c)| format!("127.0.0.1:{h}:{c}/udp")),
        (port(), 0u16..5).prop_map(|(c, n)| format!("{c}-{}", c + n)),
    ]
}

fn path() -> impl Strategy<Value = String> {
    "(/[a-z]{1,8}){1,3}"
}

proptest! {
    #[test]
    fn translation_is_idempotent(
        bindings in prop::collection::vec(binding(), 1..4),
        ports in prop::collection::vec(port(), 0..4),
        paths in prop::collection::vec(path(), 1..3),
    ) {
        let mut input = RawInput::new();
        input.insert("publish".into(), json!(bindings));
        input.insert("expose".into(), json!(ports));
        input.insert(
            "binds".into(),
            json!(paths.iter().map(|p| format!("/host{p}:{p}")).collect::<Vec<_>>()),
        );
        let options = TranslateOptions::new();

        let first = translate_input(Container, input, &options).unwrap();
        let second = translate_input(Container, first.to_raw().unwrap(), &options).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn alias_matches_canonical(value in "[a-z]{1,10}") {
        let options = TranslateOptions::new();
        let canonical = translate_input(Container, single("ipc_mode", json!(value)), &options).unwrap();
        let alias = translate_input(Container, single("ipc", json!(value)), &options).unwrap();
        prop_assert_eq!(canonical, alias);
    }

    #[test]
    fn differing_alias_values_collide(a in "[a-z]{1,10}", b in "[a-z]{1,10}") {
        prop_assume!(a != b);
        let mut input = single("ipc_mode", json!(a));
        input.insert("ipc".into(), json!(b));

        prop_assert!(translate_input(Container, input.clone(), &TranslateOptions::new()).is_err());

        let tolerant = TranslateOptions::new().ignore_collisions(true);
        let out = translate_input(Container, input, &tolerant).unwrap();
        prop_assert_eq!(serde_json::to_value(out).unwrap(), json!({"ipc_mode": a}));
    }

    #[test]
    fn port_ranges_require_ordered_bounds(start in port(), end in port()) {
        let result = get_port_range(&format!("{start}-{end}"));
        if start <= end {
            let range = result.unwrap();
            prop_assert_eq!((range.start(), range.end()), (start, end));
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn stringlist_forms_agree(paths in prop::collection::vec(path(), 1..5)) {
        let options = TranslateOptions::new();
        let joined = translate_input(Container, single("volumes", json!(paths.join(","))), &options).unwrap();
        let listed = translate_input(Container, single("volumes", json!(paths)), &options).unwrap();
        prop_assert_eq!(joined, listed);
    }

    #[test]
    fn network_translation_is_idempotent(a in 0u8..=255, b in 0u8..=255, prefix in 8u8..=30) {
        let subnet = format!("10.{a}.{b}.0/{prefix}");
        let options = TranslateOptions::new();
        let first = translate_input(Network, single("subnet", json!(subnet)), &options).unwrap();
        let second = translate_input(Network, first.to_raw().unwrap(), &options).unwrap();
        prop_assert_eq!(first, second);
    }
}
