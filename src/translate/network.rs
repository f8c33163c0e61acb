// ABOUTME: Field registry for network creation.
// ABOUTME: Addressing fields (subnet, iprange, gateway, pools) are validated as IPs when requested.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::schema::{FieldDefault, FieldKind as K, FieldSpec as F, Schema, build_revmap};
use super::sealed::Sealed;

/// Network creation parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Network;

static FIELDS: &[F] = &[
    F::new("attachable", K::Bool).since(1, 24),
    F::new("aux_addresses", K::ip_key_value('=')).with_aliases(&["aux_address"]),
    F::new("check_duplicate", K::Bool).with_default(FieldDefault::Bool(true)),
    F::new("driver", K::Str),
    F::new("driver_opts", K::key_value('=')).with_aliases(&["driver_opt", "options"]),
    F::new("enable_ipv6", K::Bool).with_aliases(&["ipv6"]).since(1, 23),
    F::new("gateway", K::IpAddr),
    F::new("ingress", K::Bool).since(1, 29),
    F::new("internal", K::Bool).since(1, 22),
    F::new("ipam", K::Dict),
    F::new("ipam_driver", K::Str),
    F::new("ipam_opts", K::key_value('=')).with_aliases(&["ipam_options"]),
    F::new("ipam_pools", K::IpamPools),
    F::new("iprange", K::Subnet).with_aliases(&["ip_range"]),
    F::new("labels", K::Labels).since(1, 23),
    F::new("scope", K::Str).since(1, 30),
    F::new("subnet", K::Subnet),
];

static ALIASES: LazyLock<BTreeMap<&'static str, &'static str>> =
    LazyLock::new(|| build_revmap(FIELDS));

impl Sealed for Network {}

impl Schema for Network {
    fn name(&self) -> &'static str {
        "network"
    }

    fn fields(&self) -> &'static [F] {
        FIELDS
    }

    fn aliases_revmap(&self) -> &'static BTreeMap<&'static str, &'static str> {
        &ALIASES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_duplicate_defaults_to_true() {
        let spec = Network.field("check_duplicate").unwrap();
        assert_eq!(spec.default, Some(FieldDefault::Bool(true)));
    }

    #[test]
    fn options_alias_resolves_to_driver_opts() {
        assert_eq!(Network.canonical_name("options"), "driver_opts");
        assert_eq!(Network.canonical_name("driver_opt"), "driver_opts");
        assert_eq!(Network.canonical_name("ip_range"), "iprange");
    }
}
