//! Read views, table rendering, and the validation gate.
//!
//! A [`Snapshot`] is the display-safe projection of a store: every key's
//! redacted value, source string, and validity flag. Text and table output
//! is a pure function of this view; raw secret values never pass through
//! it.

use serde::Serialize;

use crate::store::ConfigStore;

/// Exit status used when the store fails validation
pub const CONFIG_ERROR_EXIT: i32 = 78;

/// Placeholder shown in the table for keys with no recorded source
const NO_SOURCE: &str = "-";

/// Display state of one key
#[derive(Debug, Clone, Serialize)]
pub struct KeyState {
    /// Key name
    pub name: String,
    /// Redacted display value; empty when unset
    pub value: String,
    /// Provenance of the current value
    pub source: Option<String>,
    /// Whether the key satisfies the validity rule
    pub valid: bool,
}

/// Point-in-time view of every declared key, in name order
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// One entry per declared key
    pub entries: Vec<KeyState>,
}

impl Snapshot {
    /// Render as a plain-text table with Key / Value / Source / Valid
    /// columns
    pub fn render(&self) -> String {
        let mut key_width = "KEY".len();
        let mut value_width = "VALUE".len();
        let mut source_width = "SOURCE".len();

        for entry in &self.entries {
            key_width = key_width.max(entry.name.len());
            value_width = value_width.max(entry.value.len());
            source_width = source_width.max(entry.source.as_deref().unwrap_or(NO_SOURCE).len());
        }

        let mut out = format!(
            "{:<key_width$}  {:<value_width$}  {:<source_width$}  VALID\n",
            "KEY", "VALUE", "SOURCE",
        );
        for entry in &self.entries {
            let valid = if entry.valid { "yes" } else { "NO" };
            out.push_str(&format!(
                "{:<key_width$}  {:<value_width$}  {:<source_width$}  {}\n",
                entry.name,
                entry.value,
                entry.source.as_deref().unwrap_or(NO_SOURCE),
                valid,
            ));
        }
        out
    }
}

impl ConfigStore {
    /// Display-safe view of the whole store
    pub fn snapshot(&self) -> Snapshot {
        let entries = self
            .entries()
            .map(|key| KeyState {
                name: key.name.clone(),
                value: key.redacted(),
                source: key.source.clone(),
                valid: key.is_valid(),
            })
            .collect();
        Snapshot { entries }
    }
}

/// Print the full configuration table to stderr and terminate the process
/// with [`CONFIG_ERROR_EXIT`] if the store is invalid.
///
/// The table always covers every key, so operators see the whole state at
/// once rather than a single error message.
pub fn ensure_valid(store: &ConfigStore) {
    eprintln!("{}", store.snapshot().render());
    if !store.is_valid() {
        eprintln!("Configuration invalid: required values are missing");
        std::process::exit(CONFIG_ERROR_EXIT);
    }
}
