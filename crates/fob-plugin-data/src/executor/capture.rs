//! Decoding the export snapshot produced by the prelude's `capture`.
//!
//! The snapshot is a flat node table (`{ exports: [[name, index]], nodes }`)
//! describing what each exported value *was* in the engine: plain records,
//! class instances, `toJSON` bearers, functions and so on.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::value::{ExportValue, Exports};

#[derive(Debug, Deserialize)]
struct Snapshot {
    exports: Vec<(String, usize)>,
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "lowercase")]
enum Node {
    Undefined,
    Null,
    Bool(bool),
    /// Finite numbers as JSON numbers; `NaN` and the infinities as strings
    Number(Value),
    String(String),
    Bigint(String),
    Symbol(Option<String>),
    Function(Option<String>),
    Array(Vec<usize>),
    Record(Vec<(String, usize)>),
    Hook { name: String, json: usize },
    Instance { name: String, fields: Vec<(String, usize)> },
}

pub(crate) fn decode(snapshot: &str) -> Result<Exports, String> {
    let snapshot: Snapshot =
        serde_json::from_str(snapshot).map_err(|e| format!("malformed export snapshot: {e}"))?;

    let mut exports = Exports::new();
    for (name, index) in &snapshot.exports {
        exports.insert(name.clone(), build(&snapshot.nodes, *index)?);
    }
    Ok(exports)
}

fn build(nodes: &[Node], index: usize) -> Result<ExportValue, String> {
    let node = nodes
        .get(index)
        .ok_or_else(|| format!("export snapshot refers to missing node {index}"))?;

    Ok(match node {
        Node::Undefined => ExportValue::Undefined,
        Node::Null => ExportValue::Null,
        Node::Bool(b) => ExportValue::Bool(*b),
        Node::Number(n) => ExportValue::Number(number(n)),
        Node::String(s) => ExportValue::String(s.clone()),
        Node::Bigint(digits) => ExportValue::BigInt(digits.clone()),
        Node::Symbol(description) => ExportValue::Symbol {
            description: description.clone(),
        },
        Node::Function(name) => ExportValue::Function { name: name.clone() },
        Node::Array(items) => ExportValue::Array(
            items
                .iter()
                .map(|child| build(nodes, *child))
                .collect::<Result<_, _>>()?,
        ),
        Node::Record(entries) => ExportValue::Record(fields(nodes, entries)?),
        Node::Hook { name, json } => ExportValue::Serializable {
            type_name: name.clone(),
            json: Box::new(build(nodes, *json)?),
        },
        Node::Instance { name, fields: entries } => ExportValue::Instance {
            type_name: name.clone(),
            fields: fields(nodes, entries)?,
        },
    })
}

fn fields(nodes: &[Node], entries: &[(String, usize)]) -> Result<IndexMap<String, ExportValue>, String> {
    entries
        .iter()
        .map(|(key, child)| Ok((key.clone(), build(nodes, *child)?)))
        .collect()
}

fn number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) if s == "Infinity" => f64::INFINITY,
        Value::String(s) if s == "-Infinity" => f64::NEG_INFINITY,
        _ => f64::NAN,
    }
}
