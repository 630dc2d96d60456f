//! Text exporters over a finished store.
//!
//! Exporters are pure functions of the store and never mutate it. They
//! emit raw (unredacted) values: their purpose is generating real
//! configuration and env files, not display. Unset keys render as the
//! empty string.

use crate::error::ConfigError;
use crate::key::ConfigValue;
use crate::store::ConfigStore;

/// Flat TOML document with one entry per declared key
pub fn to_toml(store: &ConfigStore) -> Result<String, ConfigError> {
    let mut table = toml::Table::new();
    for key in store.entries() {
        let value = match &key.value {
            Some(ConfigValue::Str(s)) => toml::Value::String(s.clone()),
            Some(ConfigValue::Int(i)) => toml::Value::Integer(*i),
            Some(ConfigValue::Float(f)) => toml::Value::Float(*f),
            Some(ConfigValue::Bool(b)) => toml::Value::Boolean(*b),
            None => toml::Value::String(String::new()),
        };
        table.insert(key.name.clone(), value);
    }
    Ok(toml::to_string(&table)?)
}

/// Flat JSON document with one entry per declared key
pub fn to_json(store: &ConfigStore) -> Result<String, ConfigError> {
    let mut map = serde_json::Map::new();
    for key in store.entries() {
        let value = match &key.value {
            Some(value) => value.to_json(),
            None => serde_json::Value::String(String::new()),
        };
        map.insert(key.name.clone(), value);
    }
    Ok(serde_json::to_string(&map)?)
}

/// Newline-delimited `ENVKEY="value"` lines in env-file form
pub fn to_env(store: &ConfigStore) -> String {
    let lines: Vec<String> = store
        .entries()
        .map(|key| {
            let value = key.value.as_ref().map(ConfigValue::to_string).unwrap_or_default();
            format!("{}=\"{}\"", ConfigStore::env_key(&key.name), value)
        })
        .collect();
    lines.join("\n")
}

/// Groovy-style `params { ... }` block: strings quoted, numbers and
/// booleans bare, unset keys as `""`
pub fn to_groovy(store: &ConfigStore) -> String {
    let mut out = String::from("params {\n");
    for key in store.entries() {
        let rendered = match &key.value {
            None => "\"\"".to_string(),
            Some(ConfigValue::Str(s)) => format!("{:?}", s),
            Some(value) => value.to_string(),
        };
        out.push_str(&format!("    {} = {}\n", key.name, rendered));
    }
    out.push('}');
    out
}
