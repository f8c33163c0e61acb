// ABOUTME: Custom serde helpers for state-file field maps.
// ABOUTME: Converts YAML values (with non-string keys and tags) into JSON values.

use serde::Deserialize;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as Yaml;

use crate::translate::RawInput;

/// Convert a YAML value to JSON. Mapping keys are stringified and tags dropped.
pub fn yaml_to_json(value: Yaml) -> Value {
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => yaml_number(&n),
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(key, value)| (yaml_key(key), yaml_to_json(value)))
                .collect(),
        ),
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_number(n: &serde_yaml::Number) -> Value {
    if let Some(i) = n.as_i64() {
        Value::Number(i.into())
    } else if let Some(u) = n.as_u64() {
        Value::Number(u.into())
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)
    }
}

fn yaml_key(key: Yaml) -> String {
    match key {
        Yaml::String(s) => s,
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        Yaml::Null => "null".to_string(),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        other => yaml_to_json(other).to_string(),
    }
}

/// A mapping of raw field values, tolerating integer keys such as `80: 8080`.
pub fn deserialize_raw_input<'de, D>(deserializer: D) -> Result<RawInput, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Yaml>::deserialize(deserializer)?.map(yaml_to_json) {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a mapping of fields, found {other}"
        ))),
    }
}

/// Merge `overlay` into `base`: mappings merge recursively, anything else replaces.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => merge_maps(base, overlay),
        (base, overlay) => *base = overlay,
    }
}

pub fn merge_maps(base: &mut RawInput, overlay: RawInput) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge_values(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stringifies_integer_keys() {
        let yaml: Yaml = serde_yaml::from_str("port_bindings:\n  80: 8080\n").unwrap();
        assert_eq!(yaml_to_json(yaml), json!({"port_bindings": {"80": 8080}}));
    }

    #[test]
    fn merge_replaces_lists_and_merges_maps() {
        let mut base = json!({"labels": {"a": "1"}, "ports": [80]});
        merge_values(&mut base, json!({"labels": {"b": "2"}, "ports": [443]}));
        assert_eq!(base, json!({"labels": {"a": "1", "b": "2"}, "ports": [443]}));
    }
}
