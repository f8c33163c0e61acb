// ABOUTME: Alias resolution over a whole field registry before any coercion.
// ABOUTME: Renames aliases to canonical names and detects conflicting values.

use serde_json::Value;
use tracing::warn;

use super::coerce::coerce;
use super::error::{AliasCollisionSnafu, TranslateError};
use super::schema::{FieldSpec, Schema};
use super::value::RawInput;
use super::{ResolvedSkip, TranslateOptions};

/// Rewrite `input` so that no alias keys remain.
///
/// When both a canonical name and one of its aliases are present, the
/// canonical value is kept if the two are equal (raw, or after coercing
/// both sides) or if collisions are tolerated. Otherwise the call fails.
pub(crate) fn resolve<S: Schema>(
    schema: S,
    mut input: RawInput,
    options: &TranslateOptions,
    skip: &ResolvedSkip,
) -> Result<RawInput, TranslateError> {
    for spec in schema.fields() {
        for alias in spec.aliases {
            let Some(alias_value) = input.remove(*alias) else {
                continue;
            };

            let Some(canonical_value) = input.get(spec.name) else {
                input.insert(spec.name.to_string(), alias_value);
                continue;
            };

            if equivalent(spec, canonical_value, &alias_value, options, skip) {
                continue;
            }

            if options.ignore_collisions {
                warn!(
                    alias = *alias,
                    canonical = spec.name,
                    "both alias and canonical field supplied, keeping the canonical value"
                );
                continue;
            }

            return AliasCollisionSnafu {
                alias: *alias,
                canonical: spec.name,
            }
            .fail();
        }
    }
    Ok(input)
}

fn equivalent(
    spec: &FieldSpec,
    canonical: &Value,
    alias: &Value,
    options: &TranslateOptions,
    skip: &ResolvedSkip,
) -> bool {
    if canonical == alias {
        return true;
    }
    if skip.contains(spec.name) {
        return false;
    }
    let coerce_one = |value| coerce(spec.kind, value, options.validate_ip_addrs);
    matches!(
        (coerce_one(canonical), coerce_one(alias)),
        (Ok(a), Ok(b)) if a == b
    )
}
