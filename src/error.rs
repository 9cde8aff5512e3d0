//! Error types for effect creation, catalog loading, and scenario execution.

use thiserror::Error;

/// Failures surfaced by the public effect API.
///
/// Configuration errors (`UnknownEffect`, `MissingGeometry`) fail fast at
/// creation time. Everything downstream of a validated creation is
/// infallible; batch operations log and skip individual failures rather
/// than aborting.
#[derive(Debug, Error)]
pub enum FxError {
    /// The requested effect name is not registered in the catalog.
    #[error("unknown effect template '{0}'")]
    UnknownEffect(String),

    /// A variant was constructed without geometry its category requires
    /// (e.g. a Projectile without a target position).
    #[error("effect '{name}' is missing required geometry: {what}")]
    MissingGeometry { name: String, what: &'static str },

    /// The effect catalog file could not be read or parsed.
    #[error("failed to load effect catalog from {path}: {message}")]
    Catalog { path: String, message: String },

    /// A headless scenario file could not be read or parsed.
    #[error("invalid scenario config {path}: {message}")]
    Scenario { path: String, message: String },

    /// Writing an output file (effect log, scenario results) failed.
    #[error("failed to write {path}: {message}")]
    Io { path: String, message: String },
}
