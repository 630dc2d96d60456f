//! tierconf - Typed, provenance-tracking configuration store
//!
//! This crate implements a layered configuration store: callers declare
//! named keys with a type, optional default, and secrecy classification,
//! then populate them from sources of increasing precedence (in-process
//! assignment, root/default/profile documents, environment variables,
//! TOML/JSON files). Every key records where its current value came from,
//! and secret values are redacted on display while staying retrievable
//! programmatically.

pub mod cli;
pub mod error;
pub mod export;
pub mod key;
pub mod loader;
pub mod snapshot;
pub mod store;

pub use error::ConfigError;
pub use key::{ConfigKey, ConfigValue, KeySpec, KeyType, DEFAULT_SOURCE, SECRET_MASK};
pub use snapshot::{ensure_valid, KeyState, Snapshot, CONFIG_ERROR_EXIT};
pub use store::ConfigStore;
