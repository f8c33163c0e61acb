// ABOUTME: Maps canonical network output onto bollard's network creation request.
// ABOUTME: Top-level addressing fields and IPAM pools become IPAM configs.

use bollard::models::{Ipam, IpamConfig, NetworkCreateRequest};
use tracing::debug;

use super::{ApiError, Fields, hash_map};
use crate::translate::{CanonicalOutput, CanonicalValue};

const UNMAPPED: &[&str] = &["check_duplicate"];

/// Build the creation request for a network called `name`.
///
/// An explicit `ipam` dictionary is used as the base. Pools from
/// `ipam_pools` and a pool assembled from `subnet`, `iprange`, `gateway`
/// and `aux_addresses` are appended to its configs.
pub fn network_request(name: &str, output: &CanonicalOutput) -> Result<NetworkCreateRequest, ApiError> {
    let fields = Fields(output);
    for field in UNMAPPED {
        if output.contains_key(field) {
            debug!(field, "field has no slot in the network request");
        }
    }

    Ok(NetworkCreateRequest {
        name: name.to_string(),
        driver: fields.string("driver")?,
        scope: fields.string("scope")?,
        internal: fields.bool("internal")?,
        attachable: fields.bool("attachable")?,
        ingress: fields.bool("ingress")?,
        enable_ipv6: fields.bool("enable_ipv6")?,
        options: fields.map("driver_opts")?,
        labels: fields.map("labels")?,
        ipam: ipam(&fields)?,
        ..Default::default()
    })
}

fn ipam(fields: &Fields<'_>) -> Result<Option<Ipam>, ApiError> {
    let mut ipam = match fields.value("ipam")? {
        None => None,
        Some(CanonicalValue::Dict(dict)) => Some(
            serde_json::from_value::<Ipam>(serde_json::Value::Object(dict.clone())).map_err(
                |source| ApiError::InvalidIpam {
                    field: "ipam".to_string(),
                    source,
                },
            )?,
        ),
        Some(_) => {
            return Err(ApiError::UnexpectedValue {
                field: "ipam".to_string(),
            });
        }
    };

    let mut configs = pools(fields)?;
    if let Some(config) = top_level_pool(fields)? {
        configs.push(config);
    }
    let driver = fields.string("ipam_driver")?;
    let options = fields.map("ipam_opts")?;

    if configs.is_empty() && driver.is_none() && options.is_none() {
        return Ok(ipam);
    }

    let base = ipam.get_or_insert_with(Ipam::default);
    if driver.is_some() {
        base.driver = driver;
    }
    if options.is_some() {
        base.options = options;
    }
    if !configs.is_empty() {
        base.config.get_or_insert_with(Vec::new).extend(configs);
    }
    Ok(ipam)
}

fn pools(fields: &Fields<'_>) -> Result<Vec<IpamConfig>, ApiError> {
    match fields.value("ipam_pools")? {
        None => Ok(Vec::new()),
        Some(CanonicalValue::IpamPools(pools)) => Ok(pools
            .iter()
            .map(|pool| IpamConfig {
                subnet: pool.subnet.clone(),
                ip_range: pool.iprange.clone(),
                gateway: pool.gateway.clone(),
                auxiliary_addresses: (!pool.aux_addresses.is_empty())
                    .then(|| hash_map(&pool.aux_addresses)),
            })
            .collect()),
        Some(_) => Err(ApiError::UnexpectedValue {
            field: "ipam_pools".to_string(),
        }),
    }
}

fn top_level_pool(fields: &Fields<'_>) -> Result<Option<IpamConfig>, ApiError> {
    let subnet = fields.string("subnet")?;
    let ip_range = fields.string("iprange")?;
    let gateway = fields.string("gateway")?;
    let auxiliary_addresses = fields.map("aux_addresses")?;
    if subnet.is_none() && ip_range.is_none() && gateway.is_none() && auxiliary_addresses.is_none()
    {
        return Ok(None);
    }
    Ok(Some(IpamConfig {
        subnet,
        ip_range,
        gateway,
        auxiliary_addresses,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::{Network, TranslateOptions, translate_input};
    use serde_json::json;

    fn translate(value: serde_json::Value) -> CanonicalOutput {
        let serde_json::Value::Object(input) = value else {
            panic!("test input must be an object");
        };
        translate_input(Network, input, &TranslateOptions::new()).unwrap()
    }

    #[test]
    fn assembles_pools_into_ipam_config() {
        let output = translate(json!({
            "driver": "bridge",
            "ipam_pools": [{"subnet": "10.0.0.0/24", "gateway": "10.0.0.1"}],
            "subnet": "10.1.0.0/16",
        }));
        let request = network_request("backend", &output).unwrap();
        assert_eq!(request.name, "backend");
        assert_eq!(request.driver.as_deref(), Some("bridge"));

        let configs = request.ipam.unwrap().config.unwrap();
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].gateway.as_deref(), Some("10.0.0.1"));
        assert_eq!(configs[1].subnet.as_deref(), Some("10.1.0.0/16"));
    }

    #[test]
    fn leaves_ipam_unset_without_addressing() {
        let output = translate(json!({"internal": true}));
        let request = network_request("isolated", &output).unwrap();
        assert_eq!(request.internal, Some(true));
        assert!(request.ipam.is_none());
    }
}
