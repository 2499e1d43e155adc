// SPDX-License-Identifier: MIT

//! Built-in configuration defaults table (spec §4.4, §6).
//!
//! Mirrors the source implementation's `defaults.py` `defaultCfg` dict: each
//! known key carries both a default value and the canonical JSON type it
//! must round-trip as.

use serde_json::Value;

/// The canonical JSON shape a known config key must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Int,
    Str,
}

impl ValueKind {
    pub fn matches(&self, v: &Value) -> bool {
        match self {
            ValueKind::Bool => v.is_boolean(),
            ValueKind::Int => v.is_i64() || v.is_u64(),
            ValueKind::Str => v.is_string(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Str => "string",
        }
    }
}

/// One row of the defaults table: key, canonical kind, default value.
pub struct DefaultEntry {
    pub key: &'static str,
    pub kind: ValueKind,
    pub default: Value,
}

macro_rules! entry {
    ($key:expr, Bool, $default:expr) => {
        DefaultEntry { key: $key, kind: ValueKind::Bool, default: Value::Bool($default) }
    };
    ($key:expr, Int, $default:expr) => {
        DefaultEntry { key: $key, kind: ValueKind::Int, default: Value::from($default as i64) }
    };
    ($key:expr, Str, $default:expr) => {
        DefaultEntry { key: $key, kind: ValueKind::Str, default: Value::String($default.to_string()) }
    };
}

/// The full built-in defaults table, in the order the source's `defaults.py` lists them.
pub fn defaults_table() -> Vec<DefaultEntry> {
    vec![
        entry!("admin-mode", Bool, true),
        entry!("discovery-interval", Int, 10),
        entry!("restart-ztp-interval", Int, 300),
        entry!("curl-retries", Int, 3),
        entry!("curl-timeout", Int, 30),
        entry!("https-secure", Bool, true),
        entry!("http-user-agent", Str, "SONiC-ZTP/0.1"),
        entry!("include-http-headers", Bool, true),
        entry!("ignore-result", Bool, false),
        entry!("reboot-on-success", Bool, false),
        entry!("reboot-on-failure", Bool, false),
        entry!("halt-on-failure", Bool, false),
        entry!("restart-ztp-on-failure", Bool, false),
        entry!("restart-ztp-no-config", Bool, true),
        entry!("config-fallback", Bool, false),
        entry!("restart-ztp-on-invalid-data", Bool, true),
        entry!("monitor-startup-config", Bool, true),
        entry!("test-mode", Bool, false),
        entry!("sighandler-wait-interval", Int, 60),
        entry!("umask", Str, "022"),
        entry!("ztp-json-version", Str, "1.0"),
        entry!("feat-console-logging", Bool, true),
        entry!("feat-inband", Bool, true),
        entry!("feat-ipv4", Bool, true),
        entry!("feat-ipv6", Bool, true),
    ]
}

pub fn kind_of(key: &str) -> Option<ValueKind> {
    defaults_table().into_iter().find(|e| e.key == key).map(|e| e.kind)
}

pub fn default_of(key: &str) -> Option<Value> {
    defaults_table().into_iter().find(|e| e.key == key).map(|e| e.default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_default_value_matches_its_own_kind() {
        for entry in defaults_table() {
            assert!(
                entry.kind.matches(&entry.default),
                "default for {} does not match declared kind {:?}",
                entry.key,
                entry.kind
            );
        }
    }

    #[test]
    fn unknown_key_has_no_kind() {
        assert!(kind_of("not-a-real-key").is_none());
    }
}
