// ABOUTME: Syntactic validators for IP addresses, CIDR subnets and filesystem paths.
// ABOUTME: Leaf functions shared by the scalar coercers and the compound parsers.

use ipnetwork::IpNetwork;
use std::net::IpAddr;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("'{0}' is not a valid IP address")]
    IpAddress(String),

    #[error("'{0}' is not a valid subnet")]
    Subnet(String),

    #[error("'{0}' is not an absolute path")]
    NotAbsolute(String),
}

/// Parse a bare IPv4 or IPv6 address.
pub fn ip_addr(value: &str) -> Result<IpAddr, ValidationError> {
    value
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| ValidationError::IpAddress(value.to_string()))
}

/// Parse a CIDR subnet such as `10.0.0.0/8` or `fe80::/64`.
///
/// The prefix length is mandatory and must be at least 1; a bare address is
/// not accepted as a host route.
pub fn subnet(value: &str) -> Result<IpNetwork, ValidationError> {
    let invalid = || ValidationError::Subnet(value.to_string());
    let trimmed = value.trim();

    let (_, prefix) = trimmed.split_once('/').ok_or_else(invalid)?;
    let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
    if prefix == 0 {
        return Err(invalid());
    }

    trimmed.parse::<IpNetwork>().map_err(|_| invalid())
}

pub fn absolute_path(value: &str) -> Result<&str, ValidationError> {
    if Path::new(value).is_absolute() {
        Ok(value)
    } else {
        Err(ValidationError::NotAbsolute(value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ipv4_and_ipv6_addresses() {
        assert!(ip_addr("10.1.2.3").is_ok());
        assert!(ip_addr("::1").is_ok());
        assert!(ip_addr("fe80::1ff:fe23:4567:890a").is_ok());
    }

    #[test]
    fn rejects_out_of_range_octet() {
        let err = ip_addr("8.8.8.888").unwrap_err();
        assert_eq!(err.to_string(), "'8.8.8.888' is not a valid IP address");
    }

    #[test]
    fn subnet_requires_prefix() {
        assert!(subnet("127.0.0.1/32").is_ok());
        assert!(subnet("::1/128").is_ok());
        for bad in [
            "127.0.0.1",
            "999.999.999.999/24",
            "10.0.0.0/33",
            "::1",
            "feaz::1/128",
            "::1/129",
            "10.0.0.0/0",
        ] {
            let err = subnet(bad).unwrap_err();
            assert_eq!(err.to_string(), format!("'{bad}' is not a valid subnet"));
        }
    }

    #[test]
    fn absolute_path_check() {
        assert_eq!(absolute_path("/var/www").unwrap(), "/var/www");
        assert_eq!(
            absolute_path("var/www").unwrap_err().to_string(),
            "'var/www' is not an absolute path"
        );
    }
}
