//! CLI argument schema built from a store.
//!
//! The store supplies only the schema: one long flag per declared key,
//! required when the key is non-optional and unset, with the current value
//! as the default and a typed parser. Parsing itself is delegated to clap;
//! [`apply_matches`] writes the values the user actually provided back
//! into the store with `cli:--<key>` provenance.

use clap::parser::ValueSource;
use clap::{Arg, ArgMatches, Command};
use serde_json::Value;

use crate::error::ConfigError;
use crate::key::KeyType;
use crate::store::ConfigStore;

/// Build a clap command with one flag per declared key
pub fn command(store: &ConfigStore, name: &'static str) -> Command {
    let mut cmd = Command::new(name);
    for key in store.entries() {
        let mut arg = Arg::new(key.name.clone())
            .long(key.name.clone())
            .value_name(key.key_type.as_str().to_uppercase())
            .required(!key.optional && key.value.is_none());

        arg = match key.key_type {
            KeyType::Str => arg.value_parser(clap::value_parser!(String)),
            KeyType::Int => arg.value_parser(clap::value_parser!(i64)),
            KeyType::Float => arg.value_parser(clap::value_parser!(f64)),
            KeyType::Bool => arg.value_parser(clap::value_parser!(bool)),
        };

        if let Some(value) = &key.value {
            arg = arg.default_value(value.to_string());
        }
        cmd = cmd.arg(arg);
    }
    cmd
}

/// Write user-provided flag values back into the store.
///
/// Only values that actually came from the command line are applied;
/// defaults echoed back by clap are ignored so existing provenance is
/// preserved.
pub fn apply_matches(store: &mut ConfigStore, matches: &ArgMatches) -> Result<(), ConfigError> {
    let names: Vec<String> = store.keys().map(str::to_string).collect();
    for name in &names {
        if matches.value_source(name) != Some(ValueSource::CommandLine) {
            continue;
        }
        let key_type = store.key(name)?.key_type;
        let raw = match key_type {
            KeyType::Str => matches.get_one::<String>(name).cloned().map(Value::from),
            KeyType::Int => matches.get_one::<i64>(name).copied().map(Value::from),
            KeyType::Float => matches.get_one::<f64>(name).copied().map(Value::from),
            KeyType::Bool => matches.get_one::<bool>(name).copied().map(Value::from),
        };
        if let Some(raw) = raw {
            store.set_value(name, &raw, &format!("cli:--{}", name), false)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::KeySpec;

    fn store() -> ConfigStore {
        let mut store = ConfigStore::new();
        store.declare(KeySpec::new("my-str")).unwrap();
        store
            .declare(KeySpec::new("my-int").with_type(KeyType::Int).with_default(800))
            .unwrap();
        store.declare(KeySpec::new("my-flag").optional()).unwrap();
        store
    }

    #[test]
    fn test_schema_required_iff_unset_and_non_optional() {
        let cmd = command(&store(), "test");

        let my_str = cmd.get_arguments().find(|a| a.get_id().as_str() == "my-str").unwrap();
        assert!(my_str.is_required_set());

        // Has a default, so not required
        let my_int = cmd.get_arguments().find(|a| a.get_id().as_str() == "my-int").unwrap();
        assert!(!my_int.is_required_set());

        // Optional, so not required
        let my_flag = cmd.get_arguments().find(|a| a.get_id().as_str() == "my-flag").unwrap();
        assert!(!my_flag.is_required_set());
    }

    #[test]
    fn test_schema_carries_current_value_as_default() {
        let cmd = command(&store(), "test");
        let my_int = cmd.get_arguments().find(|a| a.get_id().as_str() == "my-int").unwrap();
        let defaults: Vec<String> = my_int
            .get_default_values()
            .iter()
            .map(|v| v.to_string_lossy().into_owned())
            .collect();
        assert_eq!(defaults, vec!["800"]);
    }

    #[test]
    fn test_apply_matches_writes_with_cli_provenance() {
        let mut store = store();
        let matches = command(&store, "test")
            .try_get_matches_from(["test", "--my-str", "hoot", "--my-int", "100"])
            .unwrap();

        apply_matches(&mut store, &matches).unwrap();

        assert_eq!(store.get_str("my-str"), Some("hoot"));
        assert_eq!(store.get_i64("my-int"), Some(100));
        assert_eq!(store.source("my-str").unwrap(), Some("cli:--my-str"));
        assert_eq!(store.source("my-int").unwrap(), Some("cli:--my-int"));
    }

    #[test]
    fn test_apply_matches_ignores_defaults() {
        let mut store = store();
        let matches = command(&store, "test")
            .try_get_matches_from(["test", "--my-str", "hoot"])
            .unwrap();

        apply_matches(&mut store, &matches).unwrap();

        // my-int came from the schema default, not the user; its builtin
        // provenance is untouched
        assert_eq!(store.get_i64("my-int"), Some(800));
        assert_eq!(store.source("my-int").unwrap(), Some("builtin:default"));
    }

    #[test]
    fn test_typed_parser_rejects_garbage() {
        let store = store();
        let result = command(&store, "test")
            .try_get_matches_from(["test", "--my-str", "x", "--my-int", "hoot"]);
        assert!(result.is_err());
    }
}
