//! Serialization guard
//!
//! Loader exports become static code, so anything that would not survive a
//! trip through plain data is rejected before compilation rather than being
//! silently dropped by the JSON normalization.

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::value::{ExportValue, ValueShape};

/// How far the guard looks into an exported value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardMode {
    /// Check every nested element of arrays, plain records and `toJSON()` results
    #[default]
    Deep,
    /// Only check the top-level value of each export
    Shallow,
}

/// Assert that an exported value can be embedded as plain data.
///
/// `export` is the export name, used in the error message.
pub fn assert_serializable(export: &str, value: &ExportValue, mode: GuardMode) -> Result<()> {
    let mut path = String::new();
    check(export, value, mode, &mut path)
}

fn check(export: &str, value: &ExportValue, mode: GuardMode, path: &mut String) -> Result<()> {
    if value.shape() == ValueShape::Opaque {
        return Err(DataError::serialization(export, value.describe(), path.clone()));
    }
    if mode == GuardMode::Shallow {
        return Ok(());
    }

    match value {
        ExportValue::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                let len = path.len();
                path.push_str(&format!("[{index}]"));
                check(export, item, mode, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        ExportValue::Record(entries) => {
            for (key, item) in entries {
                let len = path.len();
                if !path.is_empty() {
                    path.push('.');
                }
                path.push_str(key);
                check(export, item, mode, path)?;
                path.truncate(len);
            }
            Ok(())
        }
        ExportValue::Serializable { json, .. } => check(export, json, mode, path),
        _ => Ok(()),
    }
}
