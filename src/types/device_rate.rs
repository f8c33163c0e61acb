// ABOUTME: Block-device I/O throttles (`path:rate`) and blkio weights (`path:weight`).
// ABOUTME: Byte rates may carry a kb/mb/gb suffix, operation rates must be integers.

use crate::validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceRateError {
    #[error("'{item}' contains {found} value(s) (expected 2)")]
    Components { item: String, found: usize },

    #[error("Path '{0}' is not absolute")]
    NotAbsolute(String),

    #[error("Rate '{rate}' for path '{path}' is non-numeric")]
    NonNumericRate { path: String, rate: String },

    #[error("Weight '{weight}' for path '{path}' is not an integer")]
    NonNumericWeight { path: String, weight: String },

    #[error("'{0}' is not a valid device definition")]
    InvalidEntry(String),
}

/// Whether a throttle counts bytes or operations per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateUnit {
    Bytes,
    Ops,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rate {
    Count(u64),
    /// A byte rate with a unit suffix, passed to the engine unevaluated.
    WithUnit(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceRate {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Rate")]
    pub rate: Rate,
}

impl DeviceRate {
    pub fn parse(item: &str, unit: RateUnit) -> Result<Self, DeviceRateError> {
        let (path, rate) = split_pair(item)?;
        let path = absolute(path)?;
        let rate = parse_rate(&path, rate, unit)?;
        Ok(Self { path, rate })
    }

    /// Re-check an already structured entry against the rules for `unit`.
    pub fn validated(self, unit: RateUnit) -> Result<Self, DeviceRateError> {
        let path = absolute(&self.path)?;
        let rate = match self.rate {
            Rate::Count(count) => Rate::Count(count),
            Rate::WithUnit(rate) => parse_rate(&path, &rate, unit)?,
        };
        Ok(Self { path, rate })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WeightDevice {
    #[serde(rename = "Path")]
    pub path: String,
    #[serde(rename = "Weight")]
    pub weight: u16,
}

impl WeightDevice {
    pub fn parse(item: &str) -> Result<Self, DeviceRateError> {
        let (path, weight) = split_pair(item)?;
        let path = absolute(path)?;
        let weight = weight
            .parse()
            .map_err(|_| DeviceRateError::NonNumericWeight {
                path: path.clone(),
                weight: weight.to_string(),
            })?;
        Ok(Self { path, weight })
    }

    pub fn validated(self) -> Result<Self, DeviceRateError> {
        absolute(&self.path)?;
        Ok(self)
    }
}

fn split_pair(item: &str) -> Result<(&str, &str), DeviceRateError> {
    let parts: Vec<&str> = item.split(':').map(str::trim).collect();
    match parts.as_slice() {
        [path, value] => Ok((*path, *value)),
        _ => Err(DeviceRateError::Components {
            item: item.to_string(),
            found: parts.len(),
        }),
    }
}

fn absolute(path: &str) -> Result<String, DeviceRateError> {
    validate::absolute_path(path)
        .map(str::to_string)
        .map_err(|_| DeviceRateError::NotAbsolute(path.to_string()))
}

fn parse_rate(path: &str, rate: &str, unit: RateUnit) -> Result<Rate, DeviceRateError> {
    if let Ok(count) = rate.parse::<u64>() {
        return Ok(Rate::Count(count));
    }
    if unit == RateUnit::Bytes && has_size_suffix(rate) {
        return Ok(Rate::WithUnit(rate.to_string()));
    }
    Err(DeviceRateError::NonNumericRate {
        path: path.to_string(),
        rate: rate.to_string(),
    })
}

fn has_size_suffix(rate: &str) -> bool {
    let lower = rate.to_ascii_lowercase();
    ["kb", "mb", "gb"].iter().any(|suffix| {
        lower.strip_suffix(suffix).is_some_and(|digits| {
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        })
    })
}
