// ABOUTME: Sealed trait pattern for field schemas.
// ABOUTME: Only the container and network registries in this crate can be schemas.

/// Sealed trait to prevent external implementations.
///
/// Translation assumes a schema's alias table and post-processing agree
/// with its field table, which only the registries defined here guarantee.
pub trait Sealed {}
