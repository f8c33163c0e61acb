// ABOUTME: Application-wide error type for the berth binary and state-file loading.
// ABOUTME: Wraps translation, bridge, config and I/O failures behind one enum.

use std::path::PathBuf;
use thiserror::Error;

use crate::api::ApiError;
use crate::translate::TranslateError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("state file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("unknown profile: {0}")]
    UnknownProfile(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
