// ABOUTME: Host-to-container bind mounts in `host:container[:mode]` form.
// ABOUTME: The container side must be absolute; the host side may be a named volume.

use crate::validate;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("'{0}' is not a valid bind definition (expected host:container[:mode])")]
    Format(String),

    #[error("Container path '{0}' in bind definition is not absolute")]
    NotAbsolute(String),

    #[error("'{0}' is not a dictionary or list of bind definitions")]
    InvalidInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bind {
    pub host: String,
    pub container: String,
    pub mode: Option<String>,
}

impl Bind {
    pub fn new(host: &str, container: &str, mode: Option<&str>) -> Result<Self, BindError> {
        if host.is_empty() || container.is_empty() {
            return Err(BindError::Format(format!("{host}:{container}")));
        }
        validate::absolute_path(container)
            .map_err(|_| BindError::NotAbsolute(container.to_string()))?;
        Ok(Self {
            host: host.to_string(),
            container: container.to_string(),
            mode: mode.filter(|m| !m.is_empty()).map(str::to_string),
        })
    }
}

impl FromStr for Bind {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let bind = match parts.as_slice() {
            [host, container] => Self::new(host, container, None),
            [host, container, mode] => Self::new(host, container, Some(*mode)),
            _ => Err(BindError::Format(s.to_string())),
        };
        bind.map_err(|e| match e {
            BindError::Format(_) => BindError::Format(s.to_string()),
            other => other,
        })
    }
}

impl fmt::Display for Bind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mode {
            Some(mode) => write!(f, "{}:{}:{}", self.host, self.container, mode),
            None => write!(f, "{}:{}", self.host, self.container),
        }
    }
}

impl Serialize for Bind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_mode() {
        let bind: Bind = "/srv/www:/var/www:ro".parse().unwrap();
        assert_eq!(bind.container, "/var/www");
        assert_eq!(bind.mode.as_deref(), Some("ro"));
        assert_eq!(bind.to_string(), "/srv/www:/var/www:ro");

        let bind: Bind = "data:/data".parse().unwrap();
        assert_eq!(bind.host, "data");
        assert!(bind.mode.is_none());
    }

    #[test]
    fn rejects_relative_container_path() {
        assert_eq!(
            "/srv:www".parse::<Bind>().unwrap_err(),
            BindError::NotAbsolute("www".into())
        );
        assert!(matches!("/srv".parse::<Bind>(), Err(BindError::Format(_))));
    }
}
