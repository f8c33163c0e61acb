// ABOUTME: State-file types and parsing for berth.yml.
// ABOUTME: Handles YAML parsing, discovery and profile merging of translation inputs.

mod deserialize;

pub use deserialize::{merge_maps, yaml_to_json};

use crate::error::{Error, Result};
use crate::translate::{RawInput, SkipTranslate, TranslateOptions};
use crate::types::ApiVersion;
use deserialize::deserialize_raw_input;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "berth.yml";
pub const CONFIG_FILENAME_ALT: &str = "berth.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".berth/state.yml";

/// Stored translation inputs: options plus container and network field maps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateFile {
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default, deserialize_with = "deserialize_raw_input")]
    pub container: RawInput,

    #[serde(default, deserialize_with = "deserialize_raw_input")]
    pub network: RawInput,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Options as written in a state file; unset entries fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsConfig {
    pub validate_ip_addrs: Option<bool>,
    pub ignore_collisions: Option<bool>,
    pub skip_translate: Option<SkipTranslate>,
    pub api_version: Option<ApiVersion>,
}

impl OptionsConfig {
    /// Entries set in `overlay` win.
    fn merge(&mut self, overlay: &OptionsConfig) {
        if overlay.validate_ip_addrs.is_some() {
            self.validate_ip_addrs = overlay.validate_ip_addrs;
        }
        if overlay.ignore_collisions.is_some() {
            self.ignore_collisions = overlay.ignore_collisions;
        }
        if overlay.skip_translate.is_some() {
            self.skip_translate = overlay.skip_translate.clone();
        }
        if overlay.api_version.is_some() {
            self.api_version = overlay.api_version;
        }
    }

    pub fn to_options(&self) -> TranslateOptions {
        let defaults = TranslateOptions::default();
        TranslateOptions {
            validate_ip_addrs: self.validate_ip_addrs.unwrap_or(defaults.validate_ip_addrs),
            ignore_collisions: self.ignore_collisions.unwrap_or(defaults.ignore_collisions),
            skip_translate: self.skip_translate.clone().unwrap_or_default(),
            api_version: self.api_version,
        }
    }
}

/// A named overlay applied on top of the base state.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Profile {
    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default, deserialize_with = "deserialize_raw_input")]
    pub container: RawInput,

    #[serde(default, deserialize_with = "deserialize_raw_input")]
    pub network: RawInput,
}

impl StateFile {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// The base state with profile `name` merged over it.
    pub fn for_profile(&self, name: &str) -> Result<StateFile> {
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| Error::UnknownProfile(name.to_string()))?;

        let mut merged = self.clone();
        merged.options.merge(&profile.options);
        merge_maps(&mut merged.container, profile.container.clone());
        merge_maps(&mut merged.network, profile.network.clone());
        Ok(merged)
    }

    pub fn translate_options(&self) -> TranslateOptions {
        self.options.to_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STATE: &str = r#"
options:
  api_version: "1.41"
  skip_translate: ports
container:
  image: nginx
  publish:
    80: 8080
  labels:
    tier: web
network:
  driver: bridge
profiles:
  staging:
    options:
      ignore_collisions: true
    container:
      labels:
        env: staging
"#;

    #[test]
    fn parses_options_and_field_maps() {
        let state = StateFile::from_yaml(STATE).unwrap();
        let options = state.translate_options();
        assert_eq!(options.api_version, Some(ApiVersion::new(1, 41)));
        assert_eq!(options.skip_translate, SkipTranslate::fields(["ports"]));
        assert!(options.validate_ip_addrs);
        assert_eq!(state.container["publish"], json!({"80": 8080}));
        assert_eq!(state.network["driver"], json!("bridge"));
    }

    #[test]
    fn profile_merges_over_base() {
        let state = StateFile::from_yaml(STATE).unwrap().for_profile("staging").unwrap();
        assert!(state.translate_options().ignore_collisions);
        assert_eq!(state.container["labels"], json!({"tier": "web", "env": "staging"}));
        assert_eq!(state.container["image"], json!("nginx"));
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let state = StateFile::from_yaml(STATE).unwrap();
        let err = state.for_profile("prod").unwrap_err();
        assert!(matches!(err, Error::UnknownProfile(name) if name == "prod"));
    }

    #[test]
    fn empty_document_is_default() {
        let state = StateFile::from_yaml("{}").unwrap();
        assert!(state.container.is_empty());
        assert_eq!(state.translate_options(), TranslateOptions::default());
    }
}
