//! Shared plumbing: error types and engine configuration.

pub mod config;
pub mod errors;

pub use config::EngineConfig;
pub use errors::{PersonaError, Result, SyncError};
