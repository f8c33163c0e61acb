// ABOUTME: IPAM address pool for network creation.
// ABOUTME: A pool groups a subnet with its allocation range, gateway and reserved addresses.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IpamError {
    #[error("ipam_pools must be a list of dictionaries")]
    NotAListOfPools,

    #[error("'{0}' is not a valid IPAM pool key")]
    UnknownKey(String),
}

/// Keys accepted in a pool definition, mapped to their canonical spelling.
pub fn pool_key(key: &str) -> Result<&'static str, IpamError> {
    match key {
        "subnet" => Ok("subnet"),
        "iprange" | "ip_range" => Ok("iprange"),
        "gateway" => Ok("gateway"),
        "aux_addresses" | "aux_address" => Ok("aux_addresses"),
        other => Err(IpamError::UnknownKey(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct IpamPool {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iprange: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub aux_addresses: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_keys_accept_alternate_spellings() {
        assert_eq!(pool_key("ip_range").unwrap(), "iprange");
        assert_eq!(pool_key("aux_address").unwrap(), "aux_addresses");
        assert_eq!(
            pool_key("mask").unwrap_err().to_string(),
            "'mask' is not a valid IPAM pool key"
        );
    }

    #[test]
    fn empty_parts_are_omitted() {
        let pool = IpamPool {
            subnet: Some("10.0.0.0/24".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&pool).unwrap(),
            serde_json::json!({"subnet": "10.0.0.0/24"})
        );
    }
}
