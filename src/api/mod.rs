// ABOUTME: Bridge from canonical output to the engine API request models.
// ABOUTME: Builds bollard container and network creation bodies without performing any I/O.

mod container;
mod network;

pub use container::container_config;
pub use network::network_request;

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::translate::{CanonicalOutput, CanonicalValue};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("field '{0}' was passed through untranslated and cannot be mapped")]
    Untranslated(String),

    #[error("field '{field}' has an unexpected canonical value")]
    UnexpectedValue { field: String },

    #[error("value {value} of field '{field}' is out of range")]
    OutOfRange { field: String, value: i64 },

    #[error("'{value}' of field '{field}' is not a valid byte size")]
    InvalidSize { field: String, value: String },

    #[error("field '{field}' is not a valid IPAM configuration: {source}")]
    InvalidIpam {
        field: String,
        source: serde_json::Error,
    },
}

/// Typed access to canonical fields, failing on skipped or mismatched values.
pub(crate) struct Fields<'a>(pub(crate) &'a CanonicalOutput);

impl<'a> Fields<'a> {
    pub(crate) fn value(&self, field: &str) -> Result<Option<&'a CanonicalValue>, ApiError> {
        match self.0.get(field) {
            Some(CanonicalValue::Raw(_)) => Err(ApiError::Untranslated(field.to_string())),
            other => Ok(other),
        }
    }

    fn typed<T>(
        &self,
        field: &str,
        pick: impl FnOnce(&'a CanonicalValue) -> Option<T>,
    ) -> Result<Option<T>, ApiError> {
        match self.value(field)? {
            None => Ok(None),
            Some(value) => pick(value).map(Some).ok_or_else(|| ApiError::UnexpectedValue {
                field: field.to_string(),
            }),
        }
    }

    pub(crate) fn bool(&self, field: &str) -> Result<Option<bool>, ApiError> {
        self.typed(field, CanonicalValue::as_bool)
    }

    pub(crate) fn string(&self, field: &str) -> Result<Option<String>, ApiError> {
        self.typed(field, |v| v.as_str().map(str::to_string))
    }

    pub(crate) fn list(&self, field: &str) -> Result<Option<Vec<String>>, ApiError> {
        self.typed(field, |v| v.as_list().map(<[String]>::to_vec))
    }

    pub(crate) fn map(&self, field: &str) -> Result<Option<HashMap<String, String>>, ApiError> {
        self.typed(field, |v| v.as_map().map(hash_map))
    }

    /// An integer field narrowed to the width the request model uses.
    pub(crate) fn int<T: TryFrom<i64>>(&self, field: &str) -> Result<Option<T>, ApiError> {
        match self.typed(field, CanonicalValue::as_int)? {
            None => Ok(None),
            Some(value) => T::try_from(value).map(Some).map_err(|_| ApiError::OutOfRange {
                field: field.to_string(),
                value,
            }),
        }
    }

    /// A byte count given as an integer or as a size string such as `512m`.
    pub(crate) fn bytes(&self, field: &str) -> Result<Option<i64>, ApiError> {
        match self.value(field)? {
            None => Ok(None),
            Some(CanonicalValue::Int(n)) => Ok(Some(*n)),
            Some(CanonicalValue::Str(s)) => parse_bytes(s).map(Some).ok_or_else(|| {
                ApiError::InvalidSize {
                    field: field.to_string(),
                    value: s.clone(),
                }
            }),
            Some(_) => Err(ApiError::UnexpectedValue {
                field: field.to_string(),
            }),
        }
    }
}

pub(crate) fn hash_map(map: &BTreeMap<String, String>) -> HashMap<String, String> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// Parse `<digits>[b|k|kb|m|mb|g|gb]` into bytes, using binary multiples.
pub fn parse_bytes(size: &str) -> Option<i64> {
    let lower = size.trim().to_ascii_lowercase();
    let split = lower
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(lower.len());
    let (digits, unit) = lower.split_at(split);
    let count: i64 = digits.parse().ok()?;
    let multiplier: i64 = match unit {
        "" | "b" => 1,
        "k" | "kb" => 1 << 10,
        "m" | "mb" => 1 << 20,
        "g" | "gb" => 1 << 30,
        _ => return None,
    };
    count.checked_mul(multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_binary_sizes() {
        assert_eq!(parse_bytes("512"), Some(512));
        assert_eq!(parse_bytes("1k"), Some(1024));
        assert_eq!(parse_bytes("5MB"), Some(5 * 1024 * 1024));
        assert_eq!(parse_bytes("2g"), Some(2 * 1024 * 1024 * 1024));
        assert_eq!(parse_bytes("mb"), None);
        assert_eq!(parse_bytes("5tb"), None);
    }

    #[test]
    fn raw_values_cannot_be_mapped() {
        let mut output = CanonicalOutput::new();
        output.insert("tty", CanonicalValue::Raw(serde_json::json!("yes")));
        let err = Fields(&output).bool("tty").unwrap_err();
        assert!(matches!(err, ApiError::Untranslated(field) if field == "tty"));
    }
}
