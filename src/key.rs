//! Key declarations, typed values, and coercion.
//!
//! Every key carries a declared [`KeyType`]; raw values from any source are
//! coerced through it on write, never on read. Secrecy classification and
//! the display-redaction and validity predicates live here too.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Mask used when redacting secret values for display
pub const SECRET_MASK: &str = "********";

/// Source sentinel recorded for values populated from a declared default
pub const DEFAULT_SOURCE: &str = "builtin:default";

/// The closed set of types a key can declare
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// UTF-8 string (the default)
    #[default]
    Str,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// Boolean
    Bool,
}

impl KeyType {
    /// Type name used in error messages and the CLI schema
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Str => "string",
            KeyType::Int => "integer",
            KeyType::Float => "float",
            KeyType::Bool => "boolean",
        }
    }

    /// Coerce a raw JSON value into this type.
    ///
    /// `key` only labels the error. Null is not accepted here; absent
    /// values are handled by the write path before coercion.
    pub fn coerce(&self, key: &str, raw: &Value) -> Result<ConfigValue, ConfigError> {
        let mismatch = || ConfigError::TypeMismatch {
            key: key.to_string(),
            expected: self.as_str(),
        };

        match self {
            KeyType::Str => match raw {
                Value::String(s) => Ok(ConfigValue::Str(s.clone())),
                Value::Number(n) => Ok(ConfigValue::Str(n.to_string())),
                Value::Bool(b) => Ok(ConfigValue::Str(b.to_string())),
                _ => Err(mismatch()),
            },
            KeyType::Int => match raw {
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        Ok(ConfigValue::Int(i))
                    } else if let Some(f) = n.as_f64() {
                        // Truncate toward zero, as the float-to-int
                        // conversions in source documents expect
                        Ok(ConfigValue::Int(f.trunc() as i64))
                    } else {
                        Err(mismatch())
                    }
                }
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(ConfigValue::Int)
                    .map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            KeyType::Float => match raw {
                Value::Number(n) => n.as_f64().map(ConfigValue::Float).ok_or_else(mismatch),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(ConfigValue::Float)
                    .map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            KeyType::Bool => match raw {
                Value::Bool(b) => Ok(ConfigValue::Bool(*b)),
                Value::Number(n) => match n.as_i64() {
                    Some(0) => Ok(ConfigValue::Bool(false)),
                    Some(1) => Ok(ConfigValue::Bool(true)),
                    _ => Err(mismatch()),
                },
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" | "yes" => Ok(ConfigValue::Bool(true)),
                    "false" | "0" | "no" => Ok(ConfigValue::Bool(false)),
                    _ => Err(mismatch()),
                },
                _ => Err(mismatch()),
            },
        }
    }
}

/// A coerced configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// String value
    Str(String),
    /// Integer value
    Int(i64),
    /// Float value
    Float(f64),
    /// Boolean value
    Bool(bool),
}

impl ConfigValue {
    /// String contents, if this is a string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer contents, if this is an integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric contents widened to f64 (integers are accepted)
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Boolean contents, if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// JSON representation, used by the exporters
    pub fn to_json(&self) -> Value {
        match self {
            ConfigValue::Str(s) => Value::String(s.clone()),
            ConfigValue::Int(i) => Value::Number((*i).into()),
            ConfigValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            ConfigValue::Bool(b) => Value::Bool(*b),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Str(s) => write!(f, "{}", s),
            ConfigValue::Int(i) => write!(f, "{}", i),
            ConfigValue::Float(v) => write!(f, "{}", v),
            ConfigValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// One declared configuration key and its current state
#[derive(Debug, Clone, Serialize)]
pub struct ConfigKey {
    /// Immutable name, unique within a store
    pub name: String,
    /// Declared type; every incoming raw value is coerced through it
    #[serde(rename = "type")]
    pub key_type: KeyType,
    /// Currently effective value
    pub value: Option<ConfigValue>,
    /// Where the value last came from; updated atomically with `value`
    pub source: Option<String>,
    /// Display-layer redaction always fully masks the value
    pub secret: bool,
    /// Show a mask followed by the last N characters; exclusive with `secret`
    pub partial_secret: Option<usize>,
    /// Absent or empty values do not invalidate the key
    pub optional: bool,
}

impl ConfigKey {
    /// Display form with secrecy applied.
    ///
    /// Unset keys render as the empty string; secret keys as the full
    /// mask; partial-secret keys as the mask plus the last N characters.
    /// Redaction never affects the stored value.
    pub fn redacted(&self) -> String {
        let Some(value) = &self.value else {
            return String::new();
        };
        if self.secret {
            return SECRET_MASK.to_string();
        }
        let rendered = value.to_string();
        if let Some(n) = self.partial_secret {
            let skip = rendered.chars().count().saturating_sub(n);
            let tail: String = rendered.chars().skip(skip).collect();
            return format!("{}{}", SECRET_MASK, tail);
        }
        rendered
    }

    /// A non-optional key needs a present, non-empty value.
    ///
    /// Present zero and false values count as set; only absence and the
    /// empty string (for string-typed keys) invalidate a required key.
    pub fn is_valid(&self) -> bool {
        if self.optional {
            return true;
        }
        match &self.value {
            None => false,
            Some(ConfigValue::Str(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

/// Declaration options for [`crate::ConfigStore::declare`]
#[derive(Debug, Clone)]
pub struct KeySpec {
    pub(crate) name: String,
    pub(crate) key_type: KeyType,
    pub(crate) default: Option<Value>,
    pub(crate) secret: bool,
    pub(crate) partial_secret: Option<usize>,
    pub(crate) optional: bool,
}

impl KeySpec {
    /// A required, non-secret, string-typed key with no default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_type: KeyType::Str,
            default: None,
            secret: false,
            partial_secret: None,
            optional: false,
        }
    }

    /// Set the declared type
    pub fn with_type(mut self, key_type: KeyType) -> Self {
        self.key_type = key_type;
        self
    }

    /// Set a default value, coerced at declaration time
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Fully mask the value on display
    pub fn secret(mut self) -> Self {
        self.secret = true;
        self
    }

    /// Mask all but the last `n` characters on display
    pub fn with_partial_secret(mut self, n: usize) -> Self {
        self.partial_secret = Some(n);
        self
    }

    /// Allow the key to be absent or empty
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}
