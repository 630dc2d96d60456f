//! File source adapters.
//!
//! Files are parsed into `serde_json::Value` documents and handed to
//! [`ConfigStore::merge_document`] with the path as the source label. A
//! missing path is reported as [`ConfigError::SourceNotFound`], distinct
//! from a parse error, and the store is untouched by any failure that
//! precedes the merge.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::ConfigError;
use crate::store::ConfigStore;

impl ConfigStore {
    /// Merge a TOML file under root/default/profile tiers
    pub fn load_toml(&mut self, path: &Path, profile: Option<&str>) -> Result<(), ConfigError> {
        let doc = read_toml(path)?;
        self.merge_document(&doc, &path.display().to_string(), profile)
    }

    /// Merge a JSON file under root/default/profile tiers
    pub fn load_json(&mut self, path: &Path, profile: Option<&str>) -> Result<(), ConfigError> {
        let doc = read_json(path)?;
        self.merge_document(&doc, &path.display().to_string(), profile)
    }
}

fn read_toml(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    let parsed: toml::Value = toml::from_str(&contents)?;
    Ok(toml_to_json(parsed))
}

fn read_json(path: &Path) -> Result<Value, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Convert a TOML value to JSON for merging (datetimes become strings)
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            Value::Object(map)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use crate::error::ConfigError;
    use crate::key::{KeySpec, KeyType};
    use crate::store::ConfigStore;

    fn fill_store() -> ConfigStore {
        let mut store = ConfigStore::new();
        store.declare(KeySpec::new("my-str")).unwrap();
        store
            .declare(KeySpec::new("my-int").with_type(KeyType::Int))
            .unwrap();
        store
    }

    #[test]
    fn test_missing_toml_is_source_not_found() {
        let mut store = fill_store();
        let err = store
            .load_toml(std::path::Path::new("missing.toml"), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::SourceNotFound { .. }));
        // Store untouched
        assert!(store.get("my-str").is_none());
        assert!(store.get("my-int").is_none());
    }

    #[test]
    fn test_missing_json_is_source_not_found() {
        let mut store = fill_store();
        let err = store
            .load_json(std::path::Path::new("missing.json"), None)
            .unwrap_err();
        assert!(matches!(err, ConfigError::SourceNotFound { .. }));
    }

    #[test]
    fn test_toml_parse_error_is_distinct() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "my-str = ").unwrap();

        let mut store = fill_store();
        let err = store.load_toml(temp.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml(_)));
        assert!(store.get("my-str").is_none());
    }

    #[test]
    fn test_load_toml_root_values() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "my-str = \"hoot\"").unwrap();
        writeln!(temp, "my-int = 100").unwrap();

        let mut store = fill_store();
        store.load_toml(temp.path(), None).unwrap();

        assert_eq!(store.get_str("my-str"), Some("hoot"));
        assert_eq!(store.get_i64("my-int"), Some(100));
        // The path is the source label
        let source = store.source("my-str").unwrap().unwrap();
        assert_eq!(source, temp.path().display().to_string());
        assert!(store.is_valid());
    }

    #[test]
    fn test_load_toml_default_tier() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "my-str = \"meow\"").unwrap();
        writeln!(temp, "[default]").unwrap();
        writeln!(temp, "my-str = \"hoot\"").unwrap();
        writeln!(temp, "my-int = 100").unwrap();

        let mut store = fill_store();
        store.load_toml(temp.path(), None).unwrap();

        assert_eq!(store.get_str("my-str"), Some("hoot"));
        let source = store.source("my-str").unwrap().unwrap();
        assert!(source.ends_with(":default"), "source was {source:?}");
    }

    #[test]
    fn test_load_toml_profile_tier() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "my-str = \"meow\"").unwrap();
        writeln!(temp, "[default]").unwrap();
        writeln!(temp, "my-str = \"meow\"").unwrap();
        writeln!(temp, "my-int = -100").unwrap();
        writeln!(temp, "[profile.sam]").unwrap();
        writeln!(temp, "my-str = \"hoot\"").unwrap();
        writeln!(temp, "my-int = 100").unwrap();

        let mut store = fill_store();
        store.load_toml(temp.path(), Some("sam")).unwrap();

        assert_eq!(store.get_str("my-str"), Some("hoot"));
        assert_eq!(store.get_i64("my-int"), Some(100));
        let source = store.source("my-int").unwrap().unwrap();
        assert!(source.ends_with(":profile.sam"), "source was {source:?}");
    }

    #[test]
    fn test_load_json_profile_tier() {
        let mut temp = NamedTempFile::new().unwrap();
        let doc = serde_json::json!({
            "my-str": "meow",
            "default": {"my-str": "meow", "my-int": -100},
            "profile": {"sam": {"my-str": "hoot", "my-int": 100}},
        });
        write!(temp, "{}", doc).unwrap();

        let mut store = fill_store();
        store.load_json(temp.path(), Some("sam")).unwrap();

        assert_eq!(store.get_str("my-str"), Some("hoot"));
        assert_eq!(store.get_i64("my-int"), Some(100));
        assert!(store.is_valid());
    }
}
