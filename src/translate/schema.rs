// ABOUTME: Declarative field registry types: field kinds, field specs and the Schema trait.
// ABOUTME: Each registry is a static table built once and read concurrently without locks.

use std::collections::BTreeMap;

use super::error::TranslateError;
use super::sealed::Sealed;
use super::value::{CanonicalOutput, CanonicalValue};
use crate::types::{ApiVersion, RateUnit};

/// How a field's raw value is coerced. Dispatch over this enum is exhaustive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Int,
    IntOrString,
    Str,
    AbsolutePath,
    Command,
    StringList,
    PathList,
    IpList,
    KeyValue { delim: char, validate_ip_values: bool },
    Labels,
    Dict,
    User,
    Binds,
    Ports,
    PortBindings,
    DeviceRate(RateUnit),
    WeightDevice,
    Ulimits,
    RestartPolicy,
    LogConfig,
    IpamPools,
    Subnet,
    IpAddr,
}

impl FieldKind {
    pub const fn key_value(delim: char) -> Self {
        FieldKind::KeyValue {
            delim,
            validate_ip_values: false,
        }
    }

    pub const fn ip_key_value(delim: char) -> Self {
        FieldKind::KeyValue {
            delim,
            validate_ip_values: true,
        }
    }
}

/// Value inserted when a field is absent from the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    Bool(bool),
}

impl FieldDefault {
    pub fn to_value(self) -> CanonicalValue {
        match self {
            FieldDefault::Bool(b) => CanonicalValue::Bool(b),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub aliases: &'static [&'static str],
    pub min_version: Option<ApiVersion>,
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            aliases: &[],
            min_version: None,
            default: None,
        }
    }

    pub const fn with_aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    pub const fn since(self, major: u16, minor: u16) -> Self {
        Self {
            min_version: Some(ApiVersion::new(major, minor)),
            ..self
        }
    }

    pub const fn with_default(self, default: FieldDefault) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }
}

/// A field registry for one creation call.
pub trait Schema: Sealed + Copy + Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn fields(&self) -> &'static [FieldSpec];

    /// Alias name to canonical name.
    fn aliases_revmap(&self) -> &'static BTreeMap<&'static str, &'static str>;

    /// Cross-field rules applied once every field has been coerced.
    fn post_process(&self, output: &mut CanonicalOutput) -> Result<(), TranslateError> {
        let _ = output;
        Ok(())
    }

    fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|spec| spec.name == name)
    }

    /// Resolve an alias to its canonical name; other names are returned unchanged.
    fn canonical_name<'a>(&self, name: &'a str) -> &'a str {
        self.aliases_revmap().get(name).copied().unwrap_or(name)
    }
}

pub(crate) fn build_revmap(fields: &'static [FieldSpec]) -> BTreeMap<&'static str, &'static str> {
    fields
        .iter()
        .flat_map(|spec| spec.aliases.iter().map(move |alias| (*alias, spec.name)))
        .collect()
}
