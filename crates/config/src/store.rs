// SPDX-License-Identifier: MIT

//! The Config Store (spec §4.4, component C4): the persisted key/value
//! overlay on top of [`crate::defaults::defaults_table`].

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::defaults::{default_of, kind_of};
use crate::error::ConfigError;

/// A loaded configuration store, backed by a JSON object on disk.
///
/// Known keys (those present in the defaults table) are validated against
/// their canonical type at load time: a stored value whose JSON type
/// disagrees with the key's canonical type fails the load outright, rather
/// than being silently coerced or dropped. Keys the defaults table doesn't
/// know about are preserved verbatim and round-tripped on save.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl ConfigStore {
    /// An empty store backed by no file; every lookup falls through to defaults.
    pub fn empty() -> Self {
        Self { path: None, values: Map::new() }
    }

    /// Load and validate a config store from `path`. A missing file is not
    /// an error: it is treated the same as an empty store so first-boot
    /// systems with no persisted overrides still start cleanly.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self { path: Some(path.to_path_buf()), values: Map::new() });
            }
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };

        let parsed: Value = serde_json::from_str(&raw)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;

        let values = match parsed {
            Value::Object(map) => map,
            other => {
                return Err(ConfigError::NotAnObject { found: crate::error::json_type_name(&other) })
            }
        };

        for (key, value) in &values {
            if let Some(kind) = kind_of(key) {
                if !kind.matches(value) {
                    return Err(ConfigError::type_mismatch(key, kind, value));
                }
            }
        }

        Ok(Self { path: Some(path.to_path_buf()), values })
    }

    /// Persist the store back to its backing file via an atomic write.
    /// No-op when the store was constructed with [`ConfigStore::empty`].
    pub fn save(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.path else { return Ok(()) };
        ztp_core::atomic_write_json(path, &Value::Object(self.values.clone()))
            .map_err(|source| ConfigError::Io { path: path.clone(), source })
    }

    /// Set a known or unknown key. Known keys are validated against their
    /// canonical type before being accepted.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), ConfigError> {
        if let Some(kind) = kind_of(key) {
            if !kind.matches(&value) {
                return Err(ConfigError::type_mismatch(key, kind, &value));
            }
        }
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key).or_else(|| {
            debug!(key, "config key absent from store, falling back to default");
            None
        })
    }

    fn resolved(&self, key: &str) -> Option<Value> {
        self.raw(key).cloned().or_else(|| default_of(key))
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.resolved(key).and_then(|v| v.as_bool())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.resolved(key).and_then(|v| v.as_i64())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.resolved(key).and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn get_raw(&self, key: &str) -> Option<Value> {
        self.resolved(key)
    }
}

/// Lenient boolean coercion used when a policy flag can legitimately be
/// expressed as `true`/`false`, `"true"`/`"false"`, or `1`/`0` in upstream
/// document data (spec §4.5 step 4: "type-coerce to bool"). Returns `None`
/// when the value cannot be read as a boolean under any of those forms.
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" | "True" | "1" => Some(true),
            "false" | "False" | "0" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_file_loads_as_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = ConfigStore::load(&dir.path().join("nope.json")).expect("load");
        assert_eq!(store.get_i64("discovery-interval"), Some(10));
    }

    #[test]
    fn known_key_overrides_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ztp_cfg.json");
        std::fs::write(&path, json!({"discovery-interval": 42}).to_string()).expect("write");
        let store = ConfigStore::load(&path).expect("load");
        assert_eq!(store.get_i64("discovery-interval"), Some(42));
    }

    #[test]
    fn unknown_key_is_preserved_through_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ztp_cfg.json");
        let mut store = ConfigStore::load(&path).expect("load");
        store.set("vendor-extension", json!("keep-me")).expect("set");
        store.save().expect("save");

        let reloaded = ConfigStore::load(&path).expect("reload");
        assert_eq!(reloaded.get_raw("vendor-extension"), Some(json!("keep-me")));
    }

    #[test]
    fn known_key_type_mismatch_fails_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ztp_cfg.json");
        std::fs::write(&path, json!({"admin-mode": "yes"}).to_string()).expect("write");
        let err = ConfigStore::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn set_rejects_wrong_type_for_known_key() {
        let mut store = ConfigStore::empty();
        let err = store.set("curl-retries", json!("three")).unwrap_err();
        assert!(matches!(err, ConfigError::TypeMismatch { .. }));
    }

    #[test]
    fn coerce_bool_accepts_common_spellings() {
        assert_eq!(coerce_bool(&json!(true)), Some(true));
        assert_eq!(coerce_bool(&json!("false")), Some(false));
        assert_eq!(coerce_bool(&json!(1)), Some(true));
        assert_eq!(coerce_bool(&json!(0)), Some(false));
        assert_eq!(coerce_bool(&json!("maybe")), None);
    }
}
