//! Error types for store operations and source adapters.

use std::io;
use std::path::PathBuf;

/// Errors raised by store writes, reads, and source adapters
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An operation referenced a key that was never declared
    #[error("Unknown configuration key: {key}")]
    UnknownKey {
        /// The undeclared key name
        key: String,
    },

    /// An absent value was supplied for a non-optional key
    #[error("{key} cannot be null")]
    RequiredValueMissing {
        /// The key the absent value was written to
        key: String,
    },

    /// Coercion of a supplied value failed for the key's declared type
    #[error("Value for {key} is not a valid {expected}")]
    TypeMismatch {
        /// The key the value was written to
        key: String,
        /// Name of the declared type
        expected: &'static str,
    },

    /// A configuration file path does not exist (distinct from a parse error)
    #[error("Configuration source not found: {}", path.display())]
    SourceNotFound {
        /// The missing path
        path: PathBuf,
    },

    /// Failed to parse a TOML source
    #[error("Failed to parse TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// Failed to serialize to TOML
    #[error("Failed to emit TOML: {0}")]
    EmitToml(#[from] toml::ser::Error),

    /// Failed to parse or serialize JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read a configuration source
    #[error("Failed to read configuration source: {0}")]
    Io(#[from] io::Error),
}
