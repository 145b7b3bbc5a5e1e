//! Compiles loader exports into replacement module source.
//!
//! Every export is checked by the serialization guard first, then rendered as
//! a JSON literal. JSON is a subset of ECMAScript expression syntax once the
//! line/paragraph separators are escaped, so the output needs no runtime.

use serde_json::{Map, Number, Value};

use crate::error::{DataError, Result};
use crate::guard::{assert_serializable, GuardMode};
use crate::value::{ExportValue, Exports};

/// Render the export mapping as an ES module.
///
/// Export order follows the mapping's insertion order. The output is
/// deterministic for a given mapping.
pub fn compile(exports: &Exports, mode: GuardMode) -> Result<String> {
    if exports.is_empty() {
        return Ok("export {};\n".to_string());
    }

    let mut code = String::new();
    let mut aliased = 0usize;

    for (name, value) in exports {
        assert_serializable(name, value, mode)?;

        let json = to_json(name, value)?.unwrap_or(Value::Null);
        let literal = to_literal(&json)?;

        if name == "default" {
            code.push_str(&format!("export default {literal};\n"));
        } else if is_identifier(name) {
            code.push_str(&format!("export const {name} = {literal};\n"));
        } else {
            // The local binding must not shadow a real export of the same name
            let local = loop {
                let candidate = format!("__data_export_{aliased}");
                aliased += 1;
                if !exports.contains_key(&candidate) {
                    break candidate;
                }
            };
            let exported = serde_json::to_string(name)
                .map_err(|e| DataError::Config(e.to_string()))?;
            code.push_str(&format!(
                "const {local} = {literal};\nexport {{ {local} as {exported} }};\n"
            ));
        }
    }

    Ok(code)
}

/// Normalize a value the way `JSON.stringify` does.
///
/// `None` means "omitted": `undefined`, functions and symbols vanish from
/// records and turn into `null` inside arrays.
pub fn to_json(export: &str, value: &ExportValue) -> Result<Option<Value>> {
    let json = match value {
        ExportValue::Undefined | ExportValue::Function { .. } | ExportValue::Symbol { .. } => {
            return Ok(None)
        }
        ExportValue::Null => Value::Null,
        ExportValue::Bool(b) => Value::Bool(*b),
        ExportValue::Number(n) => number(*n),
        ExportValue::String(s) => Value::String(s.clone()),
        ExportValue::BigInt(_) => {
            return Err(DataError::serialization(export, value.describe(), ""));
        }
        ExportValue::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(to_json(export, item)?.unwrap_or(Value::Null));
            }
            Value::Array(out)
        }
        ExportValue::Record(fields) | ExportValue::Instance { fields, .. } => {
            let mut out = Map::with_capacity(fields.len());
            for (key, item) in fields {
                if let Some(item) = to_json(export, item)? {
                    out.insert(key.clone(), item);
                }
            }
            Value::Object(out)
        }
        ExportValue::Serializable { json, .. } => return to_json(export, json),
    };
    Ok(Some(json))
}

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Value::Number(Number::from(n as i64));
    }
    Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
}

fn to_literal(json: &Value) -> Result<String> {
    let mut text = serde_json::to_string(json).map_err(|e| DataError::Config(e.to_string()))?;
    // A `"__proto__": ..` property in an object literal sets the prototype
    // instead of defining a key; `JSON.parse` defines it as an own property.
    if has_proto_key(json) {
        let quoted = serde_json::to_string(&text).map_err(|e| DataError::Config(e.to_string()))?;
        text = format!("JSON.parse({quoted})");
    }
    Ok(text.replace('\u{2028}', "\\u2028").replace('\u{2029}', "\\u2029"))
}

fn has_proto_key(json: &Value) -> bool {
    match json {
        Value::Object(fields) => fields
            .iter()
            .any(|(key, value)| key == "__proto__" || has_proto_key(value)),
        Value::Array(items) => items.iter().any(has_proto_key),
        _ => false,
    }
}

const RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "implements", "import", "in", "instanceof", "interface", "let", "new", "null",
    "package", "private", "protected", "public", "return", "static", "super", "switch", "this",
    "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
    // not keywords, but invalid binding names in module code
    "arguments", "eval",
];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !RESERVED.contains(&name)
}
