// ABOUTME: Combined logging driver and driver options object.
// ABOUTME: The driver defaults to "none" and the options to an empty mapping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_LOG_DRIVER: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    #[serde(rename = "Type", default = "default_driver")]
    pub driver: String,
    #[serde(rename = "Config", default)]
    pub options: BTreeMap<String, String>,
}

fn default_driver() -> String {
    DEFAULT_LOG_DRIVER.to_string()
}

impl LogConfig {
    pub fn new(driver: Option<String>, options: Option<BTreeMap<String, String>>) -> Self {
        Self {
            driver: driver.unwrap_or_else(default_driver),
            options: options.unwrap_or_default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_parts_take_defaults() {
        let config = LogConfig::new(Some("syslog".into()), None);
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            json!({"Type": "syslog", "Config": {}})
        );

        let config: LogConfig = serde_json::from_value(json!({"Config": {"tag": "web"}})).unwrap();
        assert_eq!(config.driver, "none");
        assert_eq!(config.options["tag"], "web");
    }
}
