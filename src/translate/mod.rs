// ABOUTME: Translation engine entry point turning loose creation kwargs into canonical arguments.
// ABOUTME: Pipeline is skip resolution, alias resolution, version gate, coercion, post-processing, defaults.

mod alias;
pub mod coerce;
mod container;
mod error;
mod network;
mod schema;
mod sealed;
mod value;

pub use container::Container;
pub use error::{ErrorKind, TranslateError, ValueError};
pub use network::Network;
pub use schema::{FieldDefault, FieldKind, FieldSpec, Schema};
pub use value::{CanonicalOutput, CanonicalValue, RawInput};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use snafu::ResultExt;
use std::collections::BTreeSet;
use tracing::{debug, trace};

use crate::types::ApiVersion;
use error::{InvalidFieldSnafu, UnsupportedVersionSnafu};

/// Fields exempted from coercion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SkipTranslate {
    #[default]
    None,
    All,
    Fields(BTreeSet<String>),
}

impl SkipTranslate {
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            SkipTranslate::None
        } else {
            SkipTranslate::Fields(names)
        }
    }

    /// Parse a comma-separated list of field names.
    pub fn parse(names: &str) -> Self {
        Self::fields(
            names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }
}

impl Serialize for SkipTranslate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SkipTranslate::None => serializer.serialize_bool(false),
            SkipTranslate::All => serializer.serialize_bool(true),
            SkipTranslate::Fields(names) => names.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for SkipTranslate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum SkipEntry {
            Flag(bool),
            Names(String),
            List(Vec<String>),
        }

        Ok(match SkipEntry::deserialize(deserializer)? {
            SkipEntry::Flag(true) => SkipTranslate::All,
            SkipEntry::Flag(false) => SkipTranslate::None,
            SkipEntry::Names(names) => SkipTranslate::parse(&names),
            SkipEntry::List(names) => SkipTranslate::fields(names),
        })
    }
}

/// Caller-controlled translation settings. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    pub validate_ip_addrs: bool,
    pub ignore_collisions: bool,
    pub skip_translate: SkipTranslate,
    pub api_version: Option<ApiVersion>,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            validate_ip_addrs: true,
            ignore_collisions: false,
            skip_translate: SkipTranslate::None,
            api_version: None,
        }
    }
}

impl TranslateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate_ip_addrs(mut self, validate: bool) -> Self {
        self.validate_ip_addrs = validate;
        self
    }

    pub fn ignore_collisions(mut self, ignore: bool) -> Self {
        self.ignore_collisions = ignore;
        self
    }

    pub fn skip_translate(mut self, skip: SkipTranslate) -> Self {
        self.skip_translate = skip;
        self
    }

    pub fn api_version(mut self, version: ApiVersion) -> Self {
        self.api_version = Some(version);
        self
    }
}

/// Skip directive with alias names replaced by canonical names.
#[derive(Debug)]
pub(crate) enum ResolvedSkip {
    None,
    All,
    Fields(BTreeSet<String>),
}

impl ResolvedSkip {
    fn new<S: Schema>(schema: S, skip: &SkipTranslate) -> Self {
        match skip {
            SkipTranslate::None => ResolvedSkip::None,
            SkipTranslate::All => ResolvedSkip::All,
            SkipTranslate::Fields(names) => ResolvedSkip::Fields(
                names
                    .iter()
                    .map(|name| schema.canonical_name(name).to_string())
                    .collect(),
            ),
        }
    }

    pub(crate) fn contains(&self, field: &str) -> bool {
        match self {
            ResolvedSkip::None => false,
            ResolvedSkip::All => true,
            ResolvedSkip::Fields(names) => names.contains(field),
        }
    }

    fn is_all(&self) -> bool {
        matches!(self, ResolvedSkip::All)
    }
}

/// Translate raw keyword arguments into canonical arguments for `schema`.
///
/// Fails on the first invalid field; nothing is returned on failure.
/// Unrecognized fields are passed through untouched.
pub fn translate_input<S: Schema>(
    schema: S,
    input: RawInput,
    options: &TranslateOptions,
) -> Result<CanonicalOutput, TranslateError> {
    let skip = ResolvedSkip::new(schema, &options.skip_translate);
    let input = alias::resolve(schema, input, options, &skip)?;

    let mut output = CanonicalOutput::new();
    for (name, value) in input {
        let Some(spec) = schema.field(&name) else {
            debug!(schema = schema.name(), field = %name, "passing through unrecognized field");
            output.insert(name, CanonicalValue::Raw(value));
            continue;
        };

        check_version(spec, options.api_version)?;

        if skip.contains(spec.name) {
            debug!(schema = schema.name(), field = spec.name, "skipping translation");
            output.insert(name, CanonicalValue::Raw(value));
            continue;
        }

        trace!(field = spec.name, kind = ?spec.kind, "coercing");
        let canonical = coerce::coerce(spec.kind, &value, options.validate_ip_addrs)
            .context(InvalidFieldSnafu { field: spec.name })?;
        output.insert(name, canonical);
    }

    if !skip.is_all() {
        schema.post_process(&mut output)?;
    }

    for spec in schema.fields() {
        if let Some(default) = spec.default
            && !output.contains_key(spec.name)
        {
            output.insert(spec.name, default.to_value());
        }
    }

    Ok(output)
}

fn check_version(spec: &FieldSpec, declared: Option<ApiVersion>) -> Result<(), TranslateError> {
    match (spec.min_version, declared) {
        (Some(required), Some(declared)) if required > declared => UnsupportedVersionSnafu {
            field: spec.name,
            required,
            declared,
        }
        .fail(),
        _ => Ok(()),
    }
}
