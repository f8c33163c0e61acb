// ABOUTME: Translation error types with SNAFU pattern.
// ABOUTME: One invocation error for callers, classified by kind for programmatic handling.

use snafu::Snafu;
use thiserror::Error;

use crate::types::{
    ApiVersion, BindError, DeviceRateError, IpamError, PortError, RestartPolicyError,
    UlimitError,
};
use crate::validate::ValidationError;

/// Why a single raw value could not be coerced to its field's kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("'{0}' is not an integer")]
    NotAnInteger(String),

    #[error("'{0}' is not an integer or string")]
    NotIntOrString(String),

    #[error("'{0}' is not a string")]
    NotAString(String),

    #[error("'{0}' is not a string or list")]
    NotAStringOrList(String),

    #[error("'{0}' is not a list")]
    NotAList(String),

    #[error("'{0}' is not a dictionary")]
    NotADictionary(String),

    #[error("'{item}' is not a key{delim}value pair")]
    NotAPair { item: String, delim: char },

    #[error("Value for key '{0}' must be a scalar")]
    NestedValue(String),

    #[error("'{0}' must contain exactly one key")]
    MultiKeyEntry(String),

    #[error("Invalid label(s): '{0}'")]
    InvalidLabels(String),

    #[error("Value must be a username or uid")]
    NotAUser,

    #[error("'{0}' is an invalid uid")]
    InvalidUid(i64),

    #[error("'{0}' is not a valid log configuration")]
    InvalidLogConfig(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    DeviceRate(#[from] DeviceRateError),

    #[error(transparent)]
    Ulimit(#[from] UlimitError),

    #[error(transparent)]
    RestartPolicy(#[from] RestartPolicyError),

    #[error(transparent)]
    Ipam(#[from] IpamError),

    #[error(transparent)]
    Bind(#[from] BindError),
}

impl ValueError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValueError::NotAnInteger(_)
            | ValueError::NotIntOrString(_)
            | ValueError::NotAString(_)
            | ValueError::NotAStringOrList(_)
            | ValueError::NotAList(_)
            | ValueError::NotADictionary(_)
            | ValueError::NestedValue(_)
            | ValueError::NotAUser
            | ValueError::InvalidUid(_)
            | ValueError::InvalidLogConfig(_) => ErrorKind::Type,
            ValueError::NotAPair { .. }
            | ValueError::MultiKeyEntry(_)
            | ValueError::InvalidLabels(_) => ErrorKind::Format,
            ValueError::Validation(_) => ErrorKind::Validation,
            ValueError::Port(e) if e.is_range_error() => ErrorKind::Range,
            ValueError::Port(_) => ErrorKind::Format,
            ValueError::DeviceRate(e) => match e {
                DeviceRateError::NotAbsolute(_) => ErrorKind::Validation,
                DeviceRateError::NonNumericRate { .. }
                | DeviceRateError::NonNumericWeight { .. } => ErrorKind::Type,
                DeviceRateError::Components { .. } | DeviceRateError::InvalidEntry(_) => {
                    ErrorKind::Format
                }
            },
            ValueError::Ulimit(e) => match e {
                UlimitError::Format(_) => ErrorKind::Format,
                UlimitError::NonNumeric(_) => ErrorKind::Type,
            },
            ValueError::RestartPolicy(e) => match e {
                RestartPolicyError::InvalidRetryCount(_) => ErrorKind::Type,
                _ => ErrorKind::Format,
            },
            ValueError::Ipam(e) => match e {
                IpamError::NotAListOfPools => ErrorKind::Type,
                IpamError::UnknownKey(_) => ErrorKind::Format,
            },
            ValueError::Bind(e) => match e {
                BindError::Format(_) => ErrorKind::Format,
                BindError::NotAbsolute(_) => ErrorKind::Validation,
                BindError::InvalidInput(_) => ErrorKind::Type,
            },
        }
    }
}

/// Failure of a whole translation call. Nothing is returned on failure.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum TranslateError {
    #[snafu(display("{field}: {source}"))]
    InvalidField { field: String, source: ValueError },

    #[snafu(display("'{alias}' is an alias for '{canonical}', they cannot both be used"))]
    AliasCollision { alias: String, canonical: String },

    #[snafu(display(
        "{field} requires API version {required} or later (declared {declared})"
    ))]
    UnsupportedVersion {
        field: String,
        required: ApiVersion,
        declared: ApiVersion,
    },

    #[snafu(display("{field}: {reason}"))]
    Conflict { field: String, reason: String },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Value not coercible to the field's declared kind.
    Type,
    /// Canonical name and alias both supplied with differing values.
    Collision,
    /// Wrong shape or component count in a mini-grammar.
    Format,
    /// Range start after its end, or mismatched range lengths.
    Range,
    /// IP address, subnet or path failed validation.
    Validation,
    /// Field newer than the declared API version.
    VersionGate,
    /// Two fields that cannot be combined.
    Conflict,
}

impl TranslateError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::InvalidField { source, .. } => source.kind(),
            TranslateError::AliasCollision { .. } => ErrorKind::Collision,
            TranslateError::UnsupportedVersion { .. } => ErrorKind::VersionGate,
            TranslateError::Conflict { .. } => ErrorKind::Conflict,
        }
    }

    /// The canonical field the error is about.
    pub fn field(&self) -> &str {
        match self {
            TranslateError::InvalidField { field, .. }
            | TranslateError::UnsupportedVersion { field, .. }
            | TranslateError::Conflict { field, .. } => field,
            TranslateError::AliasCollision { canonical, .. } => canonical,
        }
    }
}
