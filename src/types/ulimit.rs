// ABOUTME: Resource limits in `name=soft[:hard]` form.
// ABOUTME: The hard limit defaults to the soft limit when omitted.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UlimitError {
    #[error("Ulimit definition '{0}' is not in the format type=soft_limit[:hard_limit]")]
    Format(String),

    #[error("Limit '{0}' contains non-numeric value(s)")]
    NonNumeric(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ulimit {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Soft")]
    pub soft: i64,
    #[serde(rename = "Hard")]
    pub hard: i64,
}

impl FromStr for Ulimit {
    type Err = UlimitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, limits) = s
            .split_once('=')
            .ok_or_else(|| UlimitError::Format(s.to_string()))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(UlimitError::Format(s.to_string()));
        }

        let limit = |value: &str| {
            value
                .trim()
                .parse::<i64>()
                .map_err(|_| UlimitError::NonNumeric(s.to_string()))
        };
        let (soft, hard) = match limits.split(':').collect::<Vec<_>>().as_slice() {
            [soft] => {
                let soft = limit(*soft)?;
                (soft, soft)
            }
            [soft, hard] => (limit(*soft)?, limit(*hard)?),
            _ => return Err(UlimitError::Format(s.to_string())),
        };

        Ok(Self {
            name: name.to_string(),
            soft,
            hard,
        })
    }
}

impl<'de> Deserialize<'de> for Ulimit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct Structured {
            #[serde(rename = "Name")]
            name: String,
            #[serde(rename = "Soft")]
            soft: i64,
            #[serde(rename = "Hard")]
            hard: Option<i64>,
        }

        let Structured { name, soft, hard } = Structured::deserialize(deserializer)?;
        Ok(Self {
            name,
            soft,
            hard: hard.unwrap_or(soft),
        })
    }
}
