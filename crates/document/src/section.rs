// SPDX-License-Identifier: MIT

//! ConfigurationSection (spec §3) and section-level default application
//! (spec §4.5 step 6).

use serde_json::{Map, Value};
use tracing::debug;
use ztp_config::ConfigStore;
use ztp_core::SectionStatus;

use crate::error::DocumentError;
use crate::plugin_spec::PluginSpec;
use crate::policy::{self, PolicyFlags, POLICY_KEYS};

/// A single named configuration section. `extra` preserves any payload keys
/// the section carries beyond the ones modeled here, untouched.
#[derive(Debug, Clone)]
pub struct Section {
    pub name: String,
    pub status: SectionStatus,
    pub plugin: PluginSpec,
    pub policy: PolicyFlags,
    pub suspend_exit_code: Option<i64>,
    pub start_timestamp: Option<String>,
    pub timestamp: Option<String>,
    pub exit_code: Option<i64>,
    pub error: Option<String>,
    pub description: Option<String>,
    pub extra: Map<String, Value>,
}

fn validated_suspend_exit_code(obj: &Map<String, Value>) -> Option<i64> {
    match obj.get("suspend-exit-code") {
        None => None,
        Some(v) => match v.as_i64() {
            Some(n) if n >= 0 => Some(n),
            _ => {
                debug!("dropping non-integer or negative suspend-exit-code");
                None
            }
        },
    }
}

impl Section {
    /// Parse one section's raw object, applying defaults inherited from the
    /// document's resolved policy flags (spec §4.5 step 6).
    pub fn from_value(
        name: &str,
        value: &Value,
        document_policy: PolicyFlags,
        cfg: &ConfigStore,
    ) -> Result<Self, DocumentError> {
        let obj = value.as_object().ok_or(DocumentError::InvalidPluginShape)?;

        let status = match obj.get("status").and_then(Value::as_str) {
            None => SectionStatus::Boot,
            Some(raw) => SectionStatus::parse(raw).unwrap_or_else(|| {
                debug!(status = raw, "unrecognized section status, disabling section");
                SectionStatus::Disabled
            }),
        };

        let plugin = PluginSpec::parse(obj.get("plugin"))?;
        let policy = policy::resolve(obj, Some(document_policy), cfg);
        let suspend_exit_code = validated_suspend_exit_code(obj);

        let mut extra = obj.clone();
        for key in [
            "status",
            "plugin",
            "suspend-exit-code",
            "start-timestamp",
            "timestamp",
            "exit-code",
            "error",
            "description",
        ]
        .into_iter()
        .chain(POLICY_KEYS)
        {
            extra.remove(key);
        }

        Ok(Self {
            name: name.to_string(),
            status,
            plugin,
            policy,
            suspend_exit_code,
            start_timestamp: obj.get("start-timestamp").and_then(Value::as_str).map(str::to_string),
            timestamp: obj.get("timestamp").and_then(Value::as_str).map(str::to_string),
            exit_code: obj.get("exit-code").and_then(Value::as_i64),
            error: obj.get("error").and_then(Value::as_str).map(str::to_string),
            description: obj.get("description").and_then(Value::as_str).map(str::to_string),
            extra,
        })
    }

    /// Re-render this section back to the JSON shape the document stores.
    pub fn to_value(&self) -> Value {
        let mut obj = self.extra.clone();
        obj.insert("status".to_string(), Value::String(self.status.to_string()));
        if let Some(code) = self.suspend_exit_code {
            obj.insert("suspend-exit-code".to_string(), Value::from(code));
        }
        if let Some(ts) = &self.start_timestamp {
            obj.insert("start-timestamp".to_string(), Value::String(ts.clone()));
        }
        if let Some(ts) = &self.timestamp {
            obj.insert("timestamp".to_string(), Value::String(ts.clone()));
        }
        if let Some(code) = self.exit_code {
            obj.insert("exit-code".to_string(), Value::from(code));
        }
        if let Some(err) = &self.error {
            obj.insert("error".to_string(), Value::String(err.clone()));
        }
        if let Some(desc) = &self.description {
            obj.insert("description".to_string(), Value::String(desc.clone()));
        }
        obj.insert("ignore-result".to_string(), Value::Bool(self.policy.ignore_result));
        obj.insert("reboot-on-success".to_string(), Value::Bool(self.policy.reboot_on_success));
        obj.insert("reboot-on-failure".to_string(), Value::Bool(self.policy.reboot_on_failure));
        obj.insert("halt-on-failure".to_string(), Value::Bool(self.policy.halt_on_failure));
        obj.insert("restart-ztp-on-failure".to_string(), Value::Bool(self.policy.restart_ztp_on_failure));
        obj.insert("restart-ztp-no-config".to_string(), Value::Bool(self.policy.restart_ztp_no_config));
        obj.insert("config-fallback".to_string(), Value::Bool(self.policy.config_fallback));
        Value::Object(obj)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cfg() -> ConfigStore {
        ConfigStore::empty()
    }

    #[test]
    fn missing_status_defaults_to_boot() {
        let section = Section::from_value("0001-firmware", &json!({}), PolicyFlags::default(), &cfg()).expect("parse");
        assert_eq!(section.status, SectionStatus::Boot);
    }

    #[test]
    fn invalid_status_string_is_disabled_rather_than_boot() {
        let v = json!({"status": "NOT-A-REAL-STATUS"});
        let section = Section::from_value("s", &v, PolicyFlags::default(), &cfg()).expect("parse");
        assert_eq!(section.status, SectionStatus::Disabled);
        assert!(!section.status.is_runnable());
    }

    #[test]
    fn negative_suspend_exit_code_is_dropped() {
        let v = json!({"suspend-exit-code": -1});
        let section = Section::from_value("s", &v, PolicyFlags::default(), &cfg()).expect("parse");
        assert_eq!(section.suspend_exit_code, None);
    }

    #[test]
    fn zero_suspend_exit_code_is_legal() {
        let v = json!({"suspend-exit-code": 0});
        let section = Section::from_value("s", &v, PolicyFlags::default(), &cfg()).expect("parse");
        assert_eq!(section.suspend_exit_code, Some(0));
    }

    #[test]
    fn non_integer_suspend_exit_code_is_dropped() {
        let v = json!({"suspend-exit-code": "one"});
        let section = Section::from_value("s", &v, PolicyFlags::default(), &cfg()).expect("parse");
        assert_eq!(section.suspend_exit_code, None);
    }

    #[test]
    fn opaque_payload_keys_round_trip_through_to_value() {
        let v = json!({"custom-field": "keep-me"});
        let section = Section::from_value("s", &v, PolicyFlags::default(), &cfg()).expect("parse");
        let rendered = section.to_value();
        assert_eq!(rendered.get("custom-field"), Some(&json!("keep-me")));
    }
}
