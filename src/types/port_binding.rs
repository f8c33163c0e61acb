// ABOUTME: Port binding grammar `[[host_ip:]host_port:]container_port[/proto]`.
// ABOUTME: Expands ranges into per-port host endpoints and collects them per container port.

use super::port::{PortDef, PortError, PortRange, Protocol, get_port_range, parse_ranged_port};
use nonempty::NonEmpty;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, SerializeTuple, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Where a container port is published on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEndpoint {
    /// Ephemeral port on all interfaces.
    Ephemeral,
    /// Fixed port on all interfaces.
    Port(u16),
    /// Ephemeral port on one interface.
    Ip(String),
    /// Fixed port on one interface.
    IpPort(String, u16),
}

impl HostEndpoint {
    fn new(host_ip: Option<&str>, port: Option<u16>) -> Self {
        match (host_ip, port) {
            (None, None) => HostEndpoint::Ephemeral,
            (None, Some(port)) => HostEndpoint::Port(port),
            (Some(ip), None) => HostEndpoint::Ip(ip.to_string()),
            (Some(ip), Some(port)) => HostEndpoint::IpPort(ip.to_string(), port),
        }
    }

    pub fn host_ip(&self) -> Option<&str> {
        match self {
            HostEndpoint::Ip(ip) | HostEndpoint::IpPort(ip, _) => Some(ip),
            _ => None,
        }
    }

    pub fn host_port(&self) -> Option<u16> {
        match self {
            HostEndpoint::Port(port) | HostEndpoint::IpPort(_, port) => Some(*port),
            _ => None,
        }
    }
}

impl Serialize for HostEndpoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            HostEndpoint::Ephemeral => serializer.serialize_none(),
            HostEndpoint::Port(port) => serializer.serialize_u16(*port),
            HostEndpoint::Ip(ip) => {
                let mut tuple = serializer.serialize_tuple(1)?;
                tuple.serialize_element(ip)?;
                tuple.end()
            }
            HostEndpoint::IpPort(ip, port) => {
                let mut tuple = serializer.serialize_tuple(2)?;
                tuple.serialize_element(ip)?;
                tuple.serialize_element(port)?;
                tuple.end()
            }
        }
    }
}

/// One parsed binding definition, before range expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingSpec {
    host_ip: Option<String>,
    host: Option<PortRange>,
    container: PortRange,
    protocol: Protocol,
}

impl BindingSpec {
    pub fn parse(binding: &str) -> Result<Self, PortError> {
        let parts: Vec<&str> = binding.split(':').map(str::trim).collect();

        let (host_ip, host, container) = match parts.as_slice() {
            [container] => {
                if container.is_empty() {
                    return Err(PortError::EmptyBinding);
                }
                (None, None, *container)
            }
            [host, container] => {
                if host.is_empty() {
                    return Err(PortError::EmptyHostPort(binding.to_string()));
                }
                if container.is_empty() {
                    return Err(PortError::EmptyContainerPort(binding.to_string()));
                }
                (None, Some(*host), *container)
            }
            [host_ip, host, container] => {
                if container.is_empty() {
                    return Err(PortError::EmptyContainerPort(binding.to_string()));
                }
                let host_ip = (!host_ip.is_empty()).then(|| host_ip.to_string());
                let host = (!host.is_empty()).then_some(*host);
                (host_ip, host, *container)
            }
            _ => {
                return Err(PortError::TooManyComponents {
                    binding: binding.to_string(),
                    found: parts.len(),
                });
            }
        };

        let (container, protocol) = parse_ranged_port(container)?;
        let host = host.map(get_port_range).transpose()?;

        if let Some(host) = host
            && !host.is_single()
            && !container.is_single()
            && host.len() != container.len()
        {
            return Err(PortError::RangeMismatch {
                host: host.to_string(),
                host_len: host.len(),
                container: container.to_string(),
                container_len: container.len(),
            });
        }

        Ok(Self {
            host_ip,
            host,
            container,
            protocol,
        })
    }

    pub fn host_ip(&self) -> Option<&str> {
        self.host_ip.as_deref()
    }

    /// Pair every container port with its host endpoint.
    ///
    /// Equal-length ranges pair positionally. A single value on either side
    /// applies to every port of the other side.
    pub fn expand(&self) -> Vec<(PortDef, HostEndpoint)> {
        let ip = self.host_ip.as_deref();
        let def = |port| PortDef::new(port, self.protocol);

        match self.host {
            None => self
                .container
                .ports()
                .map(|port| (def(port), HostEndpoint::new(ip, None)))
                .collect(),
            Some(host) if host.is_single() => self
                .container
                .ports()
                .map(|port| (def(port), HostEndpoint::new(ip, Some(host.start()))))
                .collect(),
            Some(host) if self.container.is_single() => host
                .ports()
                .map(|hport| (def(self.container.start()), HostEndpoint::new(ip, Some(hport))))
                .collect(),
            Some(host) => self
                .container
                .ports()
                .zip(host.ports())
                .map(|(cport, hport)| (def(cport), HostEndpoint::new(ip, Some(hport))))
                .collect(),
        }
    }
}

/// Host endpoints keyed by container port.
///
/// A container port bound once serializes to its bare endpoint; bound
/// several times it serializes to the list of endpoints in binding order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortBindings(BTreeMap<PortDef, NonEmpty<HostEndpoint>>);

impl PortBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, port: PortDef, endpoint: HostEndpoint) {
        match self.0.get_mut(&port) {
            None => {
                self.0.insert(port, NonEmpty::new(endpoint));
            }
            Some(existing) => existing.push(endpoint),
        }
    }

    pub fn get(&self, port: &PortDef) -> Option<&NonEmpty<HostEndpoint>> {
        self.0.get(port)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PortDef, &NonEmpty<HostEndpoint>)> {
        self.0.iter()
    }

    pub fn container_ports(&self) -> impl Iterator<Item = PortDef> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for PortBindings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (port, endpoints) in &self.0 {
            map.serialize_entry(&port.to_string(), &Endpoints(endpoints))?;
        }
        map.end()
    }
}

struct Endpoints<'a>(&'a NonEmpty<HostEndpoint>);

impl Serialize for Endpoints<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.len() == 1 {
            return self.0.first().serialize(serializer);
        }
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for endpoint in self.0.iter() {
            seq.serialize_element(endpoint)?;
        }
        seq.end()
    }
}

/// Read the endpoint descriptor(s) of an already-canonical binding table entry.
///
/// An array headed by a non-numeric string is a single `(ip[, port])`
/// descriptor; any other array is a list of descriptors.
pub fn endpoints_from_value(value: &Value) -> Result<Vec<HostEndpoint>, PortError> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(vec![HostEndpoint::Ephemeral]),
        Value::Array(items) if starts_with_ip(items) => Ok(vec![ip_endpoint(items, value)?]),
        Value::Array(items) => items.iter().map(single_endpoint).collect(),
        other => Ok(vec![single_endpoint(other)?]),
    }
}

fn single_endpoint(value: &Value) -> Result<HostEndpoint, PortError> {
    let invalid = || PortError::InvalidHostBinding(value.to_string());
    match value {
        Value::Null => Ok(HostEndpoint::Ephemeral),
        Value::Array(items) if starts_with_ip(items) => ip_endpoint(items, value),
        other => Ok(HostEndpoint::Port(host_port(other).ok_or_else(invalid)?)),
    }
}

/// A numeric string in head position is a host port, not an address.
fn starts_with_ip(items: &[Value]) -> bool {
    match items.first() {
        Some(Value::String(head)) => head.trim().parse::<u16>().is_err(),
        _ => false,
    }
}

fn ip_endpoint(items: &[Value], whole: &Value) -> Result<HostEndpoint, PortError> {
    let invalid = || PortError::InvalidHostBinding(whole.to_string());
    match items {
        [Value::String(ip)] | [Value::String(ip), Value::Null] => Ok(HostEndpoint::Ip(ip.clone())),
        [Value::String(ip), port] => Ok(HostEndpoint::IpPort(
            ip.clone(),
            host_port(port).ok_or_else(invalid)?,
        )),
        _ => Err(invalid()),
    }
}

fn host_port(value: &Value) -> Option<u16> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
