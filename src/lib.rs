// ABOUTME: Library root for berth - exposes the translation engine and its types.
// ABOUTME: The main binary is in main.rs.

pub mod api;
pub mod config;
pub mod error;
pub mod translate;
pub mod types;
pub mod validate;

pub use translate::{
    CanonicalOutput, CanonicalValue, Container, Network, RawInput, SkipTranslate,
    TranslateError, TranslateOptions, translate_input,
};
