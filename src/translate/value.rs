// ABOUTME: Canonical values and the canonical output mapping.
// ABOUTME: Serializes to the shapes the engine API client expects for each field.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{
    Bind, DeviceRate, IpamPool, LogConfig, PortBindings, PortDef, RestartPolicy, Ulimit,
    WeightDevice,
};

/// Raw keyword arguments, keyed by canonical or alias name.
pub type RawInput = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanonicalValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
    Dict(Map<String, Value>),
    Binds(Vec<Bind>),
    Ports(BTreeSet<PortDef>),
    PortBindings(PortBindings),
    DeviceRates(Vec<DeviceRate>),
    WeightDevices(Vec<WeightDevice>),
    Ulimits(Vec<Ulimit>),
    RestartPolicy(RestartPolicy),
    LogConfig(LogConfig),
    IpamPools(Vec<IpamPool>),
    /// Passed through without translation.
    Raw(Value),
}

impl CanonicalValue {
    pub fn is_raw(&self) -> bool {
        matches!(self, CanonicalValue::Raw(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CanonicalValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            CanonicalValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CanonicalValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            CanonicalValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            CanonicalValue::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// Translated arguments keyed by canonical field name only.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct CanonicalOutput(BTreeMap<String, CanonicalValue>);

impl CanonicalOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&CanonicalValue> {
        self.0.get(field)
    }

    pub fn get_mut(&mut self, field: &str) -> Option<&mut CanonicalValue> {
        self.0.get_mut(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: CanonicalValue) {
        self.0.insert(field.into(), value);
    }

    pub fn remove(&mut self, field: &str) -> Option<CanonicalValue> {
        self.0.remove(field)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CanonicalValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render back to raw keyword arguments, e.g. to translate again.
    pub fn to_raw(&self) -> Result<RawInput, serde_json::Error> {
        let mut raw = Map::new();
        for (field, value) in &self.0 {
            raw.insert(field.clone(), serde_json::to_value(value)?);
        }
        Ok(raw)
    }
}

impl IntoIterator for CanonicalOutput {
    type Item = (String, CanonicalValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, CanonicalValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
