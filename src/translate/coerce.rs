// ABOUTME: Per-kind coercion of raw values into canonical values.
// ABOUTME: Accepts scalars, comma-delimited strings, lists, mappings and dictlists.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

use super::error::ValueError;
use super::schema::FieldKind;
use super::value::CanonicalValue;
use crate::types::{
    Bind, BindError, BindingSpec, DeviceRate, DeviceRateError, IpamError, IpamPool, LogConfig,
    PortBindings, PortDef, PortError, RateUnit, RestartPolicy, RestartPolicyError, Ulimit,
    UlimitError, WeightDevice, endpoints_from_value, expand_port_spec, get_port_def, pool_key,
};
use crate::validate;

/// Coerce `value` according to `kind`.
pub fn coerce(
    kind: FieldKind,
    value: &Value,
    validate_ip: bool,
) -> Result<CanonicalValue, ValueError> {
    let canonical = match kind {
        FieldKind::Bool => CanonicalValue::Bool(to_bool(value)),
        FieldKind::Int => CanonicalValue::Int(to_int(value)?),
        FieldKind::IntOrString => to_int_or_string(value)?,
        FieldKind::Str => CanonicalValue::Str(to_str(value)?),
        FieldKind::AbsolutePath => {
            let path = to_str(value)?;
            validate::absolute_path(&path)?;
            CanonicalValue::Str(path)
        }
        FieldKind::Command => to_command(value)?,
        FieldKind::StringList => CanonicalValue::List(to_stringlist(value)?),
        FieldKind::PathList => {
            let paths = to_stringlist(value)?;
            for path in &paths {
                validate::absolute_path(path)?;
            }
            CanonicalValue::List(paths)
        }
        FieldKind::IpList => {
            let addrs = to_stringlist(value)?;
            if validate_ip {
                for addr in &addrs {
                    validate::ip_addr(addr)?;
                }
            }
            CanonicalValue::List(addrs)
        }
        FieldKind::KeyValue {
            delim,
            validate_ip_values,
        } => {
            let map = to_key_value(value, delim)?;
            if validate_ip && validate_ip_values {
                for addr in map.values() {
                    validate::ip_addr(addr)?;
                }
            }
            CanonicalValue::Map(map)
        }
        FieldKind::Labels => CanonicalValue::Map(to_labels(value)?),
        FieldKind::Dict => CanonicalValue::Dict(to_dict(value)?),
        FieldKind::User => CanonicalValue::Str(to_user(value)?),
        FieldKind::Binds => CanonicalValue::Binds(to_binds(value)?),
        FieldKind::Ports => CanonicalValue::Ports(to_ports(value)?),
        FieldKind::PortBindings => {
            CanonicalValue::PortBindings(to_port_bindings(value, validate_ip)?)
        }
        FieldKind::DeviceRate(unit) => CanonicalValue::DeviceRates(to_device_rates(value, unit)?),
        FieldKind::WeightDevice => CanonicalValue::WeightDevices(to_weight_devices(value)?),
        FieldKind::Ulimits => CanonicalValue::Ulimits(to_ulimits(value)?),
        FieldKind::RestartPolicy => CanonicalValue::RestartPolicy(to_restart_policy(value)?),
        FieldKind::LogConfig => CanonicalValue::LogConfig(to_log_config(value)?),
        FieldKind::IpamPools => CanonicalValue::IpamPools(to_ipam_pools(value, validate_ip)?),
        FieldKind::Subnet => CanonicalValue::Str(to_subnet(value, validate_ip)?),
        FieldKind::IpAddr => CanonicalValue::Str(to_ip(value, validate_ip)?),
    };
    Ok(canonical)
}

/// Render a value for an error message; strings appear without quotes.
pub(crate) fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Split on `delim`, trimming whitespace around every piece.
pub fn split(s: &str, delim: char) -> Vec<String> {
    s.split(delim).map(|piece| piece.trim().to_string()).collect()
}

/// The list items of a comma-delimited string, a native list or a single scalar.
fn items(value: &Value) -> Result<Vec<Value>, ValueError> {
    match value {
        Value::String(s) => Ok(split(s, ',').into_iter().map(Value::String).collect()),
        Value::Array(items) => Ok(items.clone()),
        Value::Null => Ok(Vec::new()),
        Value::Number(_) | Value::Bool(_) => Ok(vec![value.clone()]),
        Value::Object(_) => Err(ValueError::NotAList(describe(value))),
    }
}

pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub fn to_int(value: &Value) -> Result<i64, ValueError> {
    let invalid = || ValueError::NotAnInteger(describe(value));
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(i) => Ok(i),
            None => n
                .as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
                .ok_or_else(invalid),
        },
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => s.trim().parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

pub fn to_int_or_string(value: &Value) -> Result<CanonicalValue, ValueError> {
    match value {
        Value::String(s) => Ok(match s.trim().parse() {
            Ok(n) => CanonicalValue::Int(n),
            Err(_) => CanonicalValue::Str(s.clone()),
        }),
        Value::Number(_) | Value::Bool(_) => Ok(CanonicalValue::Int(to_int(value)?)),
        _ => Err(ValueError::NotIntOrString(describe(value))),
    }
}

pub fn to_str(value: &Value) -> Result<String, ValueError> {
    scalar_string(value).ok_or_else(|| ValueError::NotAString(describe(value)))
}

pub fn to_command(value: &Value) -> Result<CanonicalValue, ValueError> {
    match value {
        Value::Array(items) => Ok(CanonicalValue::List(
            items
                .iter()
                .map(|item| scalar_string(item).unwrap_or_else(|| describe(item)))
                .collect(),
        )),
        other => scalar_string(other)
            .map(CanonicalValue::Str)
            .ok_or_else(|| ValueError::NotAStringOrList(describe(other))),
    }
}

pub fn to_stringlist(value: &Value) -> Result<Vec<String>, ValueError> {
    Ok(items(value)?
        .iter()
        .map(|item| scalar_string(item).unwrap_or_else(|| describe(item)))
        .filter(|item| !item.is_empty())
        .collect())
}

fn map_value(key: &str, value: &Value) -> Result<String, ValueError> {
    match value {
        Value::Null => Ok(String::new()),
        other => scalar_string(other).ok_or_else(|| ValueError::NestedValue(key.to_string())),
    }
}

fn dictlist_entry(entry: &Map<String, Value>) -> Result<(&String, &Value), ValueError> {
    match entry.iter().next() {
        Some(pair) if entry.len() == 1 => Ok(pair),
        _ => Err(ValueError::MultiKeyEntry(describe(&Value::Object(
            entry.clone(),
        )))),
    }
}

/// Build a mapping from `key<delim>value` strings, a native mapping or a dictlist.
pub fn to_key_value(value: &Value, delim: char) -> Result<BTreeMap<String, String>, ValueError> {
    let mut map = BTreeMap::new();
    match value {
        Value::Object(obj) => {
            for (key, val) in obj {
                map.insert(key.clone(), map_value(key, val)?);
            }
        }
        Value::String(_) | Value::Array(_) | Value::Null => {
            for item in items(value)? {
                match &item {
                    Value::String(pair) => {
                        let (key, val) = pair
                            .split_once(delim)
                            .filter(|(key, _)| !key.trim().is_empty())
                            .ok_or_else(|| ValueError::NotAPair {
                                item: pair.clone(),
                                delim,
                            })?;
                        map.insert(key.trim().to_string(), val.trim().to_string());
                    }
                    Value::Object(entry) => {
                        let (key, val) = dictlist_entry(entry)?;
                        map.insert(key.clone(), map_value(key, val)?);
                    }
                    other => {
                        return Err(ValueError::NotAPair {
                            item: describe(other),
                            delim,
                        });
                    }
                }
            }
        }
        other => return Err(ValueError::NotADictionary(describe(other))),
    }
    Ok(map)
}

/// Like [`to_key_value`] with `=`, but a bare label maps to an empty value.
pub fn to_labels(value: &Value) -> Result<BTreeMap<String, String>, ValueError> {
    let mut labels = BTreeMap::new();
    match value {
        Value::Object(obj) => {
            for (key, val) in obj {
                labels.insert(key.clone(), map_value(key, val)?);
            }
        }
        Value::String(_) | Value::Array(_) | Value::Null => {
            for item in items(value)? {
                match &item {
                    Value::Object(entry) => {
                        let (key, val) = dictlist_entry(entry)
                            .map_err(|_| ValueError::InvalidLabels(describe(&item)))?;
                        labels.insert(key.clone(), map_value(key, val)?);
                    }
                    other => {
                        let label = scalar_string(other)
                            .ok_or_else(|| ValueError::InvalidLabels(describe(other)))?;
                        match label.split_once('=') {
                            Some((key, val)) => {
                                labels.insert(key.trim().to_string(), val.trim().to_string())
                            }
                            None => labels.insert(label.trim().to_string(), String::new()),
                        };
                    }
                }
            }
        }
        other => return Err(ValueError::InvalidLabels(describe(other))),
    }
    Ok(labels)
}

/// A native mapping, or a dictlist folded into one mapping.
pub fn to_dict(value: &Value) -> Result<Map<String, Value>, ValueError> {
    match value {
        Value::Object(obj) => Ok(obj.clone()),
        Value::Array(entries) => {
            let mut dict = Map::new();
            for entry in entries {
                let Value::Object(entry) = entry else {
                    return Err(ValueError::NotADictionary(describe(value)));
                };
                let (key, val) = dictlist_entry(entry)?;
                dict.insert(key.clone(), val.clone());
            }
            Ok(dict)
        }
        other => Err(ValueError::NotADictionary(describe(other))),
    }
}

pub fn to_user(value: &Value) -> Result<String, ValueError> {
    match value {
        Value::String(name) => Ok(name.clone()),
        Value::Number(n) => match (n.as_i64(), n.as_u64()) {
            (Some(uid), _) if uid < 0 => Err(ValueError::InvalidUid(uid)),
            (_, Some(uid)) => Ok(uid.to_string()),
            _ => Err(ValueError::NotAUser),
        },
        _ => Err(ValueError::NotAUser),
    }
}

pub fn to_binds(value: &Value) -> Result<Vec<Bind>, ValueError> {
    let invalid = |v: &Value| ValueError::Bind(BindError::InvalidInput(describe(v)));

    if let Value::Object(obj) = value {
        let mut binds = Vec::with_capacity(obj.len());
        for (host, spec) in obj {
            let bind = match spec {
                Value::String(container) => Bind::new(host, container, None)?,
                Value::Object(spec) => {
                    let container = spec
                        .get("bind")
                        .and_then(Value::as_str)
                        .ok_or_else(|| invalid(value))?;
                    let mode = spec.get("mode").and_then(Value::as_str);
                    Bind::new(host, container, mode)?
                }
                _ => return Err(invalid(value)),
            };
            binds.push(bind);
        }
        return Ok(binds);
    }

    items(value)?
        .iter()
        .map(|item| -> Result<Bind, ValueError> {
            match item {
                Value::String(definition) => Ok(definition.parse::<Bind>()?),
                other => Err(invalid(other)),
            }
        })
        .collect()
}

pub fn to_ports(value: &Value) -> Result<BTreeSet<PortDef>, ValueError> {
    let mut ports = BTreeSet::new();
    for item in items(value)? {
        let invalid = || PortError::InvalidDefinition(describe(&item));
        match &item {
            Value::String(spec) => ports.extend(expand_port_spec(spec)?),
            Value::Number(n) => {
                let port = n
                    .as_u64()
                    .and_then(|n| u16::try_from(n).ok())
                    .filter(|port| *port != 0)
                    .ok_or_else(invalid)?;
                ports.insert(PortDef::tcp(port));
            }
            Value::Array(pair) => match pair.as_slice() {
                [port, Value::String(proto)] => {
                    let port = port
                        .as_u64()
                        .and_then(|n| u16::try_from(n).ok())
                        .filter(|port| *port != 0)
                        .ok_or_else(invalid)?;
                    ports.insert(PortDef::new(port, proto.parse()?));
                }
                _ => return Err(invalid().into()),
            },
            _ => return Err(invalid().into()),
        }
    }
    Ok(ports)
}

pub fn to_port_bindings(value: &Value, validate_ip: bool) -> Result<PortBindings, ValueError> {
    let mut table = PortBindings::new();

    if let Value::Object(obj) = value {
        for (key, endpoints) in obj {
            let port = get_port_def(key, None)?;
            for endpoint in endpoints_from_value(endpoints)? {
                if validate_ip && let Some(ip) = endpoint.host_ip() {
                    validate::ip_addr(ip)?;
                }
                table.insert(port, endpoint);
            }
        }
        return Ok(table);
    }

    for item in items(value)? {
        let binding = scalar_string(&item)
            .ok_or_else(|| PortError::InvalidDefinition(describe(&item)))?;
        let spec = BindingSpec::parse(&binding)?;
        if validate_ip && let Some(ip) = spec.host_ip() {
            validate::ip_addr(ip)?;
        }
        for (port, endpoint) in spec.expand() {
            table.insert(port, endpoint);
        }
    }
    Ok(table)
}

pub fn to_device_rates(value: &Value, unit: RateUnit) -> Result<Vec<DeviceRate>, ValueError> {
    items(value)?
        .into_iter()
        .map(|item| -> Result<DeviceRate, ValueError> {
            match item {
                Value::String(definition) => Ok(DeviceRate::parse(&definition, unit)?),
                Value::Object(_) => {
                    let rate: DeviceRate = serde_json::from_value(item.clone())
                        .map_err(|_| DeviceRateError::InvalidEntry(describe(&item)))?;
                    Ok(rate.validated(unit)?)
                }
                other => Err(DeviceRateError::InvalidEntry(describe(&other)).into()),
            }
        })
        .collect()
}

pub fn to_weight_devices(value: &Value) -> Result<Vec<WeightDevice>, ValueError> {
    items(value)?
        .into_iter()
        .map(|item| -> Result<WeightDevice, ValueError> {
            match item {
                Value::String(definition) => Ok(WeightDevice::parse(&definition)?),
                Value::Object(_) => {
                    let weight: WeightDevice = serde_json::from_value(item.clone())
                        .map_err(|_| DeviceRateError::InvalidEntry(describe(&item)))?;
                    Ok(weight.validated()?)
                }
                other => Err(DeviceRateError::InvalidEntry(describe(&other)).into()),
            }
        })
        .collect()
}

pub fn to_ulimits(value: &Value) -> Result<Vec<Ulimit>, ValueError> {
    items(value)?
        .into_iter()
        .map(|item| -> Result<Ulimit, ValueError> {
            match item {
                Value::String(definition) => Ok(definition.parse::<Ulimit>()?),
                Value::Object(_) => serde_json::from_value(item.clone())
                    .map_err(|_| UlimitError::Format(describe(&item)).into()),
                other => Err(UlimitError::Format(describe(&other)).into()),
            }
        })
        .collect()
}

pub fn to_restart_policy(value: &Value) -> Result<RestartPolicy, ValueError> {
    let unknown = || RestartPolicyError::UnknownPolicy(describe(value));
    match value {
        Value::String(definition) => Ok(definition.parse()?),
        Value::Array(entries) => match entries.as_slice() {
            [single] => to_restart_policy(single),
            [] => Err(unknown().into()),
            _ => Err(RestartPolicyError::MultiplePolicies.into()),
        },
        Value::Object(_) => serde_json::from_value(value.clone()).map_err(|_| unknown().into()),
        _ => Err(unknown().into()),
    }
}

pub fn to_log_config(value: &Value) -> Result<LogConfig, ValueError> {
    let invalid = || ValueError::InvalidLogConfig(describe(value));
    match value {
        Value::String(driver) => Ok(LogConfig::new(Some(driver.clone()), None)),
        Value::Object(obj) => {
            let mut driver = None;
            let mut options = None;
            for (key, val) in obj {
                match key.as_str() {
                    "Type" => driver = Some(to_str(val).map_err(|_| invalid())?),
                    "Config" => options = Some(to_key_value(val, '=')?),
                    _ => return Err(invalid()),
                }
            }
            Ok(LogConfig::new(driver, options))
        }
        _ => Err(invalid()),
    }
}

pub fn to_ipam_pools(value: &Value, validate_ip: bool) -> Result<Vec<IpamPool>, ValueError> {
    let Value::Array(entries) = value else {
        return Err(IpamError::NotAListOfPools.into());
    };

    let mut pools = Vec::with_capacity(entries.len());
    for entry in entries {
        let Value::Object(entry) = entry else {
            return Err(IpamError::NotAListOfPools.into());
        };
        let mut pool = IpamPool::default();
        for (key, val) in entry {
            match pool_key(key)? {
                "subnet" => pool.subnet = Some(to_subnet(val, validate_ip)?),
                "iprange" => pool.iprange = Some(to_subnet(val, validate_ip)?),
                "gateway" => pool.gateway = Some(to_ip(val, validate_ip)?),
                _ => {
                    let aux = to_key_value(val, '=')?;
                    if validate_ip {
                        for addr in aux.values() {
                            validate::ip_addr(addr)?;
                        }
                    }
                    pool.aux_addresses = aux;
                }
            }
        }
        pools.push(pool);
    }
    Ok(pools)
}

pub fn to_subnet(value: &Value, validate_ip: bool) -> Result<String, ValueError> {
    let subnet = to_str(value)?;
    if validate_ip {
        validate::subnet(&subnet)?;
    }
    Ok(subnet)
}

pub fn to_ip(value: &Value, validate_ip: bool) -> Result<String, ValueError> {
    let addr = to_str(value)?;
    if validate_ip {
        validate::ip_addr(&addr)?;
    }
    Ok(addr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bool_follows_truthiness() {
        for truthy in [json!(true), json!("foo"), json!("0"), json!(1), json!([0])] {
            assert!(to_bool(&truthy), "{truthy} should be true");
        }
        for falsy in [json!(false), json!(0), json!(""), json!(null), json!({})] {
            assert!(!to_bool(&falsy), "{falsy} should be false");
        }
    }

    #[test]
    fn int_parses_numeric_strings() {
        assert_eq!(to_int(&json!(" 42 ")).unwrap(), 42);
        assert_eq!(to_int(&json!(7.9)).unwrap(), 7);
        assert_eq!(
            to_int(&json!("foo")).unwrap_err().to_string(),
            "'foo' is not an integer"
        );
        assert!(to_int(&json!([1])).is_err());
    }

    #[test]
    fn int_or_string_falls_back_to_string() {
        assert_eq!(
            to_int_or_string(&json!("512M")).unwrap(),
            CanonicalValue::Str("512M".into())
        );
        assert_eq!(
            to_int_or_string(&json!("1024")).unwrap(),
            CanonicalValue::Int(1024)
        );
    }

    #[test]
    fn stringlist_preserves_order_and_duplicates() {
        assert_eq!(
            to_stringlist(&json!("b, a,b")).unwrap(),
            vec!["b", "a", "b"]
        );
        assert_eq!(to_stringlist(&json!([1, "x"])).unwrap(), vec!["1", "x"]);
    }

    #[test]
    fn key_value_accepts_every_shape() {
        let expected: BTreeMap<String, String> =
            [("bar".into(), "baz".into()), ("foo".into(), "1".into())].into();
        for value in [
            json!("foo=1,bar=baz"),
            json!(["foo=1", "bar=baz"]),
            json!({"foo": 1, "bar": "baz"}),
            json!([{"foo": 1}, {"bar": "baz"}]),
        ] {
            assert_eq!(to_key_value(&value, '=').unwrap(), expected, "{value}");
        }
    }

    #[test]
    fn key_value_rejects_missing_delimiter_and_multi_key_entries() {
        assert_eq!(
            to_key_value(&json!("foo"), ':').unwrap_err().to_string(),
            "'foo' is not a key:value pair"
        );
        assert!(matches!(
            to_key_value(&json!([{"a": 1, "b": 2}]), '='),
            Err(ValueError::MultiKeyEntry(_))
        ));
        assert!(matches!(
            to_key_value(&json!({"a": [1]}), '='),
            Err(ValueError::NestedValue(_))
        ));
    }

    #[test]
    fn labels_default_to_empty_value() {
        let labels = to_labels(&json!(["foo", "bar=baz", {"hello": "world"}])).unwrap();
        assert_eq!(labels["foo"], "");
        assert_eq!(labels["bar"], "baz");
        assert_eq!(labels["hello"], "world");
        assert!(matches!(
            to_labels(&json!([{"a": "1", "b": "2"}])),
            Err(ValueError::InvalidLabels(_))
        ));
    }

    #[test]
    fn dict_requires_mapping() {
        assert_eq!(
            to_dict(&json!("foo")).unwrap_err().to_string(),
            "'foo' is not a dictionary"
        );
        let dict = to_dict(&json!([{"/run": "size=64k"}, {"/tmp": ""}])).unwrap();
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn user_accepts_names_and_uids() {
        assert_eq!(to_user(&json!("root")).unwrap(), "root");
        assert_eq!(to_user(&json!(1000)).unwrap(), "1000");
        assert_eq!(
            to_user(&json!(-1)).unwrap_err().to_string(),
            "'-1' is an invalid uid"
        );
        assert_eq!(
            to_user(&json!(["a"])).unwrap_err().to_string(),
            "Value must be a username or uid"
        );
    }

    #[test]
    fn ports_reject_floats() {
        assert_eq!(
            to_ports(&json!([1.0])).unwrap_err().to_string(),
            "'1.0' is not a valid port definition"
        );
    }

    #[test]
    fn command_keeps_string_verbatim() {
        assert_eq!(
            to_command(&json!("sleep 60")).unwrap(),
            CanonicalValue::Str("sleep 60".into())
        );
        assert_eq!(
            to_command(&json!(["sleep", 60])).unwrap(),
            CanonicalValue::List(vec!["sleep".into(), "60".into()])
        );
    }

    #[test]
    fn subnet_validation_can_be_disabled() {
        assert!(to_subnet(&json!("10.0.0.0/33"), true).is_err());
        assert_eq!(to_subnet(&json!("10.0.0.0/33"), false).unwrap(), "10.0.0.0/33");
    }
}
