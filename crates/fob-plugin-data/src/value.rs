//! Export values produced by evaluating a data loader.
//!
//! A loader's exports are captured as [`ExportValue`]s: a closed set of variants
//! describing what the evaluated JavaScript value *was*, not only what it would
//! serialize to. Keeping class instances, functions and hook-bearing objects
//! distinguishable is what lets the serialization guard reject lossy exports.

use indexmap::IndexMap;
use std::fmt;

/// Ordered export mapping (`export name → value`) in declaration order
pub type Exports = IndexMap<String, ExportValue>;

/// A value exported by a data loader
#[derive(Debug, Clone, PartialEq)]
pub enum ExportValue {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Decimal digits of a `bigint`
    BigInt(String),
    Symbol {
        description: Option<String>,
    },
    Array(Vec<ExportValue>),
    /// Plain object (`{}` literal, `Object.create(null)`, JSON import)
    Record(IndexMap<String, ExportValue>),
    /// Object exposing a `toJSON()` hook; `json` is what the hook returned
    Serializable {
        type_name: String,
        json: Box<ExportValue>,
    },
    /// Instance of a class without a `toJSON()` hook
    Instance {
        type_name: String,
        fields: IndexMap<String, ExportValue>,
    },
    Function {
        name: Option<String>,
    },
}

/// Coarse classification the serialization guard decides on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Primitive,
    Array,
    PlainRecord,
    SerializationHook,
    Opaque,
}

impl ExportValue {
    pub fn shape(&self) -> ValueShape {
        match self {
            ExportValue::Null
            | ExportValue::Bool(_)
            | ExportValue::Number(_)
            | ExportValue::String(_) => ValueShape::Primitive,
            ExportValue::Array(_) => ValueShape::Array,
            ExportValue::Record(_) => ValueShape::PlainRecord,
            ExportValue::Serializable { .. } => ValueShape::SerializationHook,
            ExportValue::Undefined
            | ExportValue::BigInt(_)
            | ExportValue::Symbol { .. }
            | ExportValue::Instance { .. }
            | ExportValue::Function { .. } => ValueShape::Opaque,
        }
    }

    /// Human readable description used in error messages
    pub fn describe(&self) -> String {
        match self {
            ExportValue::Undefined => "undefined".to_string(),
            ExportValue::Null => "null".to_string(),
            ExportValue::Bool(_) => "boolean".to_string(),
            ExportValue::Number(_) => "number".to_string(),
            ExportValue::String(_) => "string".to_string(),
            ExportValue::BigInt(_) => "bigint".to_string(),
            ExportValue::Symbol { description } => match description {
                Some(desc) => format!("symbol `{desc}`"),
                None => "symbol".to_string(),
            },
            ExportValue::Array(_) => "array".to_string(),
            ExportValue::Record(_) => "object".to_string(),
            ExportValue::Serializable { type_name, .. } => format!("{type_name} with toJSON()"),
            ExportValue::Instance { type_name, .. } => format!("instance of {type_name}"),
            ExportValue::Function { name } => match name {
                Some(name) => format!("function `{name}`"),
                None => "anonymous function".to_string(),
            },
        }
    }

    pub fn record<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ExportValue)>,
    {
        ExportValue::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl From<serde_json::Value> for ExportValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ExportValue::Null,
            serde_json::Value::Bool(b) => ExportValue::Bool(b),
            serde_json::Value::Number(n) => ExportValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => ExportValue::String(s),
            serde_json::Value::Array(items) => {
                ExportValue::Array(items.into_iter().map(ExportValue::from).collect())
            }
            serde_json::Value::Object(map) => ExportValue::Record(
                map.into_iter()
                    .map(|(k, v)| (k, ExportValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ExportValue {
    fn from(value: &str) -> Self {
        ExportValue::String(value.to_string())
    }
}

impl From<f64> for ExportValue {
    fn from(value: f64) -> Self {
        ExportValue::Number(value)
    }
}

impl From<bool> for ExportValue {
    fn from(value: bool) -> Self {
        ExportValue::Bool(value)
    }
}

impl fmt::Display for ExportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
