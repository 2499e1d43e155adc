// SPDX-License-Identifier: MIT

//! `plugin` field parsing (spec §3, §9 design note: "model as a tagged
//! variant `PluginSource`"). Parsed once at document-load time so that
//! shape errors surface at load rather than mid-execution.

use serde_json::Value;

use crate::error::DocumentError;

/// Where a section's executable comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PluginSource {
    /// A literal plugin name (bare string, or `{name}`, or the section's own
    /// name when `plugin` is absent entirely).
    Name(String),
    /// `{url: URL}` — downloaded to the section's plugin cache.
    Url(Value),
    /// `{dynamic-url: DynamicURL}` — resolved then downloaded.
    DynamicUrl(Value),
    /// `plugin` field was absent; resolver derives a name from the section key.
    Absent,
}

/// Fully-parsed `plugin` field, including the object-form execution options.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSpec {
    pub source: PluginSource,
    pub shell: bool,
    pub umask: Option<String>,
    pub args: Option<String>,
    pub ignore_section_data: bool,
}

impl Default for PluginSpec {
    fn default() -> Self {
        Self { source: PluginSource::Absent, shell: false, umask: None, args: None, ignore_section_data: false }
    }
}

impl PluginSpec {
    /// Parse a section's `plugin` value, or `None` when the field is absent.
    pub fn parse(value: Option<&Value>) -> Result<Self, DocumentError> {
        let Some(value) = value else { return Ok(Self::default()) };

        match value {
            Value::String(name) => Ok(Self { source: PluginSource::Name(name.clone()), ..Self::default() }),
            Value::Object(obj) => {
                let source = if let Some(dynamic) = obj.get("dynamic-url") {
                    PluginSource::DynamicUrl(dynamic.clone())
                } else if let Some(url) = obj.get("url") {
                    PluginSource::Url(url.clone())
                } else if let Some(Value::String(name)) = obj.get("name") {
                    PluginSource::Name(name.clone())
                } else {
                    return Err(DocumentError::InvalidPluginShape);
                };

                let shell = obj.get("shell").and_then(Value::as_bool).unwrap_or(false);
                let umask = obj.get("umask").and_then(Value::as_str).map(str::to_string);
                let args = obj.get("args").and_then(Value::as_str).map(str::to_string);
                let ignore_section_data =
                    obj.get("ignore-section-data").and_then(Value::as_bool).unwrap_or(false);

                Ok(Self { source, shell, umask, args, ignore_section_data })
            }
            _ => Err(DocumentError::InvalidPluginShape),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_plugin_defaults_to_absent_source() {
        let spec = PluginSpec::parse(None).expect("parse");
        assert_eq!(spec.source, PluginSource::Absent);
    }

    #[test]
    fn bare_string_is_a_name() {
        let spec = PluginSpec::parse(Some(&json!("firmware"))).expect("parse");
        assert_eq!(spec.source, PluginSource::Name("firmware".to_string()));
    }

    #[test]
    fn object_with_dynamic_url_takes_precedence_over_url_and_name() {
        let v = json!({"dynamic-url": {"source": {"identifier": "hostname"}}, "url": {"source": "x"}, "name": "y"});
        let spec = PluginSpec::parse(Some(&v)).expect("parse");
        assert!(matches!(spec.source, PluginSource::DynamicUrl(_)));
    }

    #[test]
    fn object_with_no_recognizable_source_is_invalid() {
        let err = PluginSpec::parse(Some(&json!({"shell": true}))).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidPluginShape));
    }

    #[test]
    fn execution_options_are_parsed() {
        let v = json!({"name": "firmware", "shell": true, "umask": "022", "args": "--force", "ignore-section-data": true});
        let spec = PluginSpec::parse(Some(&v)).expect("parse");
        assert!(spec.shell);
        assert_eq!(spec.umask.as_deref(), Some("022"));
        assert_eq!(spec.args.as_deref(), Some("--force"));
        assert!(spec.ignore_section_data);
    }
}
