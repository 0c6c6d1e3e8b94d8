//! Error types for the persona engine.
//!
//! Ordinary constraint violations (a rejected point edit, an attempt to
//! silence the last active voice) are not errors: they surface as no-op
//! return values.  These types cover the remaining boundary failures:
//! configuration loading, snapshot parsing, and backend synchronization.

use thiserror::Error;

/// Result alias for fallible engine operations.
pub type Result<T> = std::result::Result<T, PersonaError>;

/// Errors raised while configuring the engine or reading backend data.
#[derive(Debug, Error)]
pub enum PersonaError {
    /// Configuration values are inconsistent (e.g. `min > max`).
    #[error("Configuration error: {0}")]
    Config(String),

    /// YAML parsing or serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value supplied across the backend boundary is malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A trait identifier string did not name one of the three traits.
    #[error("Unknown trait: {0}")]
    UnknownTrait(String),
}

/// Failure reported by the backend persistence collaborator.
///
/// Never propagated out of a controller mutator: the local state change has
/// already been applied and stays authoritative.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SyncError {
    /// The backend could not be reached.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the update.
    #[error("Backend rejected update: {0}")]
    Rejected(String),
}
