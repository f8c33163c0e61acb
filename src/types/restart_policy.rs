// ABOUTME: Container restart policy in `name[:retry_count]` form.
// ABOUTME: Supports no, always, unless-stopped and on-failure; retry count defaults to 0.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RestartPolicyError {
    #[error("only one policy is permitted")]
    MultiplePolicies,

    #[error("unknown restart policy: {0}")]
    UnknownPolicy(String),

    #[error("invalid max retries: {0}")]
    InvalidRetryCount(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestartPolicyName {
    #[default]
    No,
    Always,
    UnlessStopped,
    OnFailure,
}

impl FromStr for RestartPolicyName {
    type Err = RestartPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "no" => Ok(RestartPolicyName::No),
            "always" => Ok(RestartPolicyName::Always),
            "unless-stopped" => Ok(RestartPolicyName::UnlessStopped),
            "on-failure" => Ok(RestartPolicyName::OnFailure),
            other => Err(RestartPolicyError::UnknownPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for RestartPolicyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartPolicyName::No => write!(f, "no"),
            RestartPolicyName::Always => write!(f, "always"),
            RestartPolicyName::UnlessStopped => write!(f, "unless-stopped"),
            RestartPolicyName::OnFailure => write!(f, "on-failure"),
        }
    }
}

impl Serialize for RestartPolicyName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RestartPolicyName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RestartPolicy {
    #[serde(rename = "Name")]
    pub name: RestartPolicyName,
    #[serde(rename = "MaximumRetryCount", default)]
    pub maximum_retry_count: u32,
}

impl RestartPolicy {
    /// Parse a policy given as one or more comma-separated definitions.
    pub fn from_definitions<'a>(
        mut definitions: impl Iterator<Item = &'a str>,
    ) -> Result<Self, RestartPolicyError> {
        let first = definitions
            .next()
            .ok_or_else(|| RestartPolicyError::UnknownPolicy(String::new()))?;
        if definitions.next().is_some() {
            return Err(RestartPolicyError::MultiplePolicies);
        }
        first.parse()
    }
}

impl FromStr for RestartPolicy {
    type Err = RestartPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.contains(',') {
            return Self::from_definitions(s.split(','));
        }

        let (name, retries) = match s.split_once(':') {
            Some((name, retries)) => {
                let retries = retries.trim();
                let count = retries
                    .parse::<u32>()
                    .map_err(|_| RestartPolicyError::InvalidRetryCount(retries.to_string()))?;
                (name, count)
            }
            None => (s, 0),
        };

        Ok(Self {
            name: name.parse()?,
            maximum_retry_count: retries,
        })
    }
}

impl fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.maximum_retry_count {
            0 => write!(f, "{}", self.name),
            n => write!(f, "{}:{}", self.name, n),
        }
    }
}
