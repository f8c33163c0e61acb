// ABOUTME: Port definitions, port ranges and the error type shared by port parsers.
// ABOUTME: TCP ports serialize as bare integers, UDP ports as (port, "udp") pairs.

use serde::ser::{Serialize, SerializeTuple, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error("'{0}' is non-numeric or an invalid port range")]
    NonNumeric(String),

    #[error(
        "Start of port range ({start}) cannot be greater than end of port range ({end})"
    )]
    RangeOrder { start: u16, end: u16 },

    #[error("'{0}' is not a supported protocol (expected tcp or udp)")]
    UnknownProtocol(String),

    #[error("'{0}' is not a valid port definition")]
    InvalidDefinition(String),

    #[error(
        "'{binding}' is an invalid port binding definition (at most 3 components are allowed, found {found})"
    )]
    TooManyComponents { binding: String, found: usize },

    #[error(
        "Host port range ({host}) does not have the same number of ports as the container port range ({container}): {host_len} != {container_len}"
    )]
    RangeMismatch {
        host: String,
        host_len: usize,
        container: String,
        container_len: usize,
    },

    #[error("Empty host port in port binding definition '{0}'")]
    EmptyHostPort(String),

    #[error("Empty container port in port binding definition '{0}'")]
    EmptyContainerPort(String),

    #[error("Empty port binding definition found")]
    EmptyBinding,

    #[error("'{0}' is not a valid host binding")]
    InvalidHostBinding(String),
}

impl PortError {
    /// True when the failure is an ordering or cardinality problem of a range.
    pub fn is_range_error(&self) -> bool {
        matches!(
            self,
            PortError::RangeOrder { .. } | PortError::RangeMismatch { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl FromStr for Protocol {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            _ => Err(PortError::UnknownProtocol(s.to_string())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
        }
    }
}

/// A single container port with its protocol.
///
/// Ordering puts every TCP port before every UDP port, ascending within each
/// protocol, which is the order the ports list is emitted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PortDef {
    protocol: Protocol,
    port: u16,
}

impl PortDef {
    pub fn new(port: u16, protocol: Protocol) -> Self {
        Self { protocol, port }
    }

    pub fn tcp(port: u16) -> Self {
        Self::new(port, Protocol::Tcp)
    }

    pub fn udp(port: u16) -> Self {
        Self::new(port, Protocol::Udp)
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Key form used by the engine API, always carrying the protocol (`80/tcp`).
    pub fn api_key(&self) -> String {
        format!("{}/{}", self.port, self.protocol)
    }
}

impl fmt::Display for PortDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.protocol {
            Protocol::Tcp => write!(f, "{}", self.port),
            Protocol::Udp => write!(f, "{}/udp", self.port),
        }
    }
}

impl FromStr for PortDef {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        get_port_def(s, None)
    }
}

impl Serialize for PortDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.protocol {
            Protocol::Tcp => serializer.serialize_u16(self.port),
            Protocol::Udp => {
                let mut tuple = serializer.serialize_tuple(2)?;
                tuple.serialize_element(&self.port)?;
                tuple.serialize_element("udp")?;
                tuple.end()
            }
        }
    }
}

/// An inclusive, contiguous range of port numbers. A single port has `start == end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn is_single(&self) -> bool {
        self.start == self.end
    }

    pub fn ports(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Build a port definition from a port number with an optional protocol.
///
/// A `/proto` suffix on `port` takes precedence over `protocol`.
pub fn get_port_def(port: &str, protocol: Option<Protocol>) -> Result<PortDef, PortError> {
    let trimmed = port.trim();
    let (number, protocol) = match trimmed.split_once('/') {
        Some((number, suffix)) => (number, suffix.parse()?),
        None => (trimmed, protocol.unwrap_or_default()),
    };
    let number = number
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|number| *number != 0)
        .ok_or_else(|| PortError::InvalidDefinition(port.to_string()))?;
    Ok(PortDef::new(number, protocol))
}

/// Parse a single port or a hyphenated range `A-B`. Port 0 is not a port.
pub fn get_port_range(expr: &str) -> Result<PortRange, PortError> {
    let trimmed = expr.trim();
    let parse = |s: &str| {
        s.trim()
            .parse::<u16>()
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| PortError::NonNumeric(expr.to_string()))
    };

    let (start, end) = match trimmed.split_once('-') {
        Some((start, end)) => (parse(start)?, parse(end)?),
        None => {
            let port = parse(trimmed)?;
            (port, port)
        }
    };

    if start > end {
        return Err(PortError::RangeOrder { start, end });
    }
    Ok(PortRange { start, end })
}

/// Split `range[/proto]` into its range and protocol.
pub fn parse_ranged_port(spec: &str) -> Result<(PortRange, Protocol), PortError> {
    match spec.split_once('/') {
        Some((range, proto)) => Ok((get_port_range(range)?, proto.parse()?)),
        None => Ok((get_port_range(spec)?, Protocol::Tcp)),
    }
}

/// Expand `range[/proto]` into one definition per port.
pub fn expand_port_spec(spec: &str) -> Result<Vec<PortDef>, PortError> {
    let (range, protocol) = parse_ranged_port(spec)?;
    Ok(range.ports().map(|port| PortDef::new(port, protocol)).collect())
}
