// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

use crate::defaults::ValueKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config store {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config store root must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("config key '{key}' has type {found}, expected {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl ConfigError {
    pub fn type_mismatch(key: &str, expected: ValueKind, found: &serde_json::Value) -> Self {
        ConfigError::TypeMismatch {
            key: key.to_string(),
            expected: expected.name(),
            found: json_type_name(found),
        }
    }
}

pub fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
