//! The key registry and merge engine.
//!
//! [`ConfigStore`] owns every declared key exclusively; all mutation goes
//! through [`ConfigStore::set_value`], which applies coercion, the
//! nullability rule for optional keys, and source attribution. Dictionary
//! and environment merges are built on top of that single write path.

use std::collections::BTreeMap;
use std::panic::Location;

use serde_json::Value;

use crate::error::ConfigError;
use crate::key::{ConfigKey, ConfigValue, KeySpec, DEFAULT_SOURCE};

/// Typed, provenance-tracking configuration store.
///
/// Created empty; callers declare keys, then apply sources in increasing
/// precedence order. Each source overwrites the value and recorded source
/// of every key it touches; keys a source does not mention keep their
/// previous value and source.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    // BTreeMap gives the lexicographic display order directly
    keys: BTreeMap<String, ConfigKey>,
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or entirely re-declare) a key.
    ///
    /// A present default is coerced immediately and recorded with the
    /// `builtin:default` source; a zero or false default is preserved
    /// exactly. `secret` forces `partial_secret` off.
    pub fn declare(&mut self, spec: KeySpec) -> Result<(), ConfigError> {
        let KeySpec {
            name,
            key_type,
            default,
            secret,
            partial_secret,
            optional,
        } = spec;

        let partial_secret = if secret { None } else { partial_secret };
        let (value, source) = match default {
            Some(raw) => (
                Some(key_type.coerce(&name, &raw)?),
                Some(DEFAULT_SOURCE.to_string()),
            ),
            None => (None, None),
        };

        self.keys.insert(
            name.clone(),
            ConfigKey {
                name,
                key_type,
                value,
                source,
                secret,
                partial_secret,
                optional,
            },
        );
        Ok(())
    }

    /// Whether `name` was ever declared
    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }

    /// Number of declared keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store has no declared keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Declared names in lexicographic order, independent of declaration
    /// order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Declared keys in lexicographic name order
    pub fn entries(&self) -> impl Iterator<Item = &ConfigKey> {
        self.keys.values()
    }

    /// Full state of one declared key
    pub fn key(&self, name: &str) -> Result<&ConfigKey, ConfigError> {
        self.keys.get(name).ok_or_else(|| ConfigError::UnknownKey {
            key: name.to_string(),
        })
    }

    // --- write path ---

    /// The single point of mutation.
    ///
    /// A JSON null counts as an absent value: it clears an optional key
    /// and is rejected with [`ConfigError::RequiredValueMissing`] for a
    /// required one. Present values are coerced through the key's declared
    /// type. On failure the key is left untouched. On success the value is
    /// replaced and the source replaced, or appended to the prior source
    /// with a comma when `append_source` is set.
    pub fn set_value(
        &mut self,
        name: &str,
        raw: &Value,
        source: &str,
        append_source: bool,
    ) -> Result<(), ConfigError> {
        let key = self.keys.get_mut(name).ok_or_else(|| ConfigError::UnknownKey {
            key: name.to_string(),
        })?;

        let value = match raw {
            Value::Null => {
                if !key.optional {
                    return Err(ConfigError::RequiredValueMissing {
                        key: name.to_string(),
                    });
                }
                None
            }
            raw => Some(key.key_type.coerce(name, raw)?),
        };

        key.value = value;
        key.source = match (append_source, key.source.take()) {
            (true, Some(prior)) => Some(format!("{},{}", prior, source)),
            _ => Some(source.to_string()),
        };
        Ok(())
    }

    /// Assign a value with call-site provenance (`src:<file>:<line>`)
    #[track_caller]
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        let caller = Location::caller();
        let source = format!("src:{}:{}", caller.file(), caller.line());
        self.set_value(name, &value.into(), &source, false)
    }

    /// Assign a value with an explicit source label
    pub fn set_from(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        source: &str,
    ) -> Result<(), ConfigError> {
        self.set_value(name, &value.into(), source, false)
    }

    /// Assign a value, appending the source to the existing provenance
    /// (comma-joined audit trail)
    pub fn set_appending(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        source: &str,
    ) -> Result<(), ConfigError> {
        self.set_value(name, &value.into(), source, true)
    }

    // --- document merge ---

    /// Apply one document as a three-tier override stack.
    ///
    /// Per declared key, in order: the root value `doc[name]` (source
    /// `<source>`), then `doc["default"][name]` (source
    /// `<source>:default`), then `doc["profile"][profile][name]` (source
    /// `<source>:profile.<profile>`). The last matching tier wins, so
    /// profile beats default beats root beats any pre-existing value.
    /// Keys matched by no tier keep their previous value and source.
    ///
    /// There is no rollback: a type mismatch partway through leaves keys
    /// already written by this call mutated.
    pub fn merge_document(
        &mut self,
        doc: &Value,
        source: &str,
        profile: Option<&str>,
    ) -> Result<(), ConfigError> {
        let names: Vec<String> = self.keys.keys().cloned().collect();
        for name in &names {
            if let Some(raw) = doc.get(name) {
                self.set_value(name, raw, source, false)?;
            }
            if let Some(raw) = doc.get("default").and_then(|tier| tier.get(name)) {
                self.set_value(name, raw, &format!("{}:default", source), false)?;
            }
            if let Some(profile) = profile {
                let tier = doc.get("profile").and_then(|p| p.get(profile));
                if let Some(raw) = tier.and_then(|tier| tier.get(name)) {
                    self.set_value(
                        name,
                        raw,
                        &format!("{}:profile.{}", source, profile),
                        false,
                    )?;
                }
            }
        }
        Ok(())
    }

    // --- environment merge ---

    /// Environment variable name for a key: uppercase, with every
    /// non-alphanumeric character replaced by an underscore. Idempotent.
    pub fn env_key(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect()
    }

    /// Merge set, non-empty environment variables over the declared keys,
    /// with source `env:<NAME>`
    pub fn merge_env(&mut self) -> Result<(), ConfigError> {
        self.merge_env_with(|name| std::env::var(name).ok())
    }

    /// [`ConfigStore::merge_env`] with an injected lookup, so tests and
    /// embedders can supply variables without touching the process
    /// environment
    pub fn merge_env_with(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let names: Vec<String> = self.keys.keys().cloned().collect();
        for name in &names {
            let env_name = Self::env_key(name);
            let Some(raw) = lookup(&env_name) else {
                continue;
            };
            if raw.is_empty() {
                continue;
            }
            self.set_value(name, &Value::String(raw), &format!("env:{}", env_name), false)?;
        }
        Ok(())
    }

    // --- projections ---

    /// Effective value, or `None` when the key is unset or undeclared.
    ///
    /// This is the permissive accessor; use [`ConfigStore::get_strict`]
    /// when an undeclared key should be an error.
    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.keys.get(name).and_then(|key| key.value.as_ref())
    }

    /// Effective string value, if set and string-typed
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(ConfigValue::as_str)
    }

    /// Effective integer value, if set and integer-typed
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(ConfigValue::as_i64)
    }

    /// Effective numeric value widened to f64, if set
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(ConfigValue::as_f64)
    }

    /// Effective boolean value, if set and boolean-typed
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(ConfigValue::as_bool)
    }

    /// Effective value of a declared key; [`ConfigError::UnknownKey`] for
    /// undeclared names, `None` when declared but unset
    pub fn get_strict(&self, name: &str) -> Result<Option<&ConfigValue>, ConfigError> {
        self.key(name).map(|key| key.value.as_ref())
    }

    /// Provenance of a declared key's current value
    pub fn source(&self, name: &str) -> Result<Option<&str>, ConfigError> {
        self.key(name).map(|key| key.source.as_deref())
    }

    /// Display form of a declared key with secrecy applied
    pub fn redacted(&self, name: &str) -> Result<String, ConfigError> {
        self.key(name).map(ConfigKey::redacted)
    }

    /// Whether one key satisfies the validity rule; false for undeclared
    /// names
    pub fn is_key_valid(&self, name: &str) -> bool {
        self.keys.get(name).map(ConfigKey::is_valid).unwrap_or(false)
    }

    /// Whether every declared key is valid; true on an empty store
    pub fn is_valid(&self) -> bool {
        self.keys.values().all(ConfigKey::is_valid)
    }
}
