// SPDX-License-Identifier: MIT

//! URL & Dynamic URL (component C3, spec §4.3).

use serde_json::Value;
use ztp_config::ConfigStore;
use ztp_core::{Clock, Paths};

use crate::downloader::{self, DownloadOptions, DownloadOutcome};
use crate::error::UrlShapeError;
use crate::identifier::{self, IdentifierSpec};
use crate::identity::SystemIdentity;

fn field_bool(obj: &serde_json::Map<String, Value>, key: &str) -> Option<bool> {
    obj.get(key).and_then(ztp_config::coerce_bool)
}

fn field_string(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

fn field_u64(obj: &serde_json::Map<String, Value>, key: &str) -> Option<u64> {
    obj.get(key).and_then(|v| v.as_u64())
}

/// `{source, destination?, secure?, include-http-headers?, encrypted?,
/// timeout?, curl-arguments?}`, or a bare string meaning `{source}` (spec §3).
#[derive(Debug, Clone)]
pub struct Url {
    source: String,
    destination: Option<String>,
    options: DownloadOptions,
}

impl Url {
    /// Build a `Url` from provisioning-document JSON. `destination` is the
    /// caller-supplied fallback; an in-payload `destination` wins over it.
    pub fn from_value(value: &Value, destination: Option<&str>) -> Result<Self, UrlShapeError> {
        match value {
            Value::String(s) => Ok(Self {
                source: s.clone(),
                destination: destination.map(str::to_string),
                options: DownloadOptions::default(),
            }),
            Value::Object(obj) => {
                let source = obj
                    .get("source")
                    .ok_or(UrlShapeError::MissingSource)?
                    .as_str()
                    .ok_or(UrlShapeError::SourceNotString)?
                    .to_string();

                let payload_dest = match obj.get("destination") {
                    None => None,
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(_) => return Err(UrlShapeError::DestinationNotString),
                };

                Ok(Self {
                    source,
                    destination: payload_dest.or_else(|| destination.map(str::to_string)),
                    options: DownloadOptions {
                        include_http_headers: field_bool(obj, "include-http-headers"),
                        secure: field_bool(obj, "secure"),
                        timeout_secs: field_u64(obj, "timeout"),
                        retries: None,
                        curl_arguments: field_string(obj, "curl-arguments"),
                    },
                })
            }
            _ => Err(UrlShapeError::SourceNotString),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// `Url.Download(dest?) -> (code, path?)`; delegates to the Downloader.
    pub async fn download(
        &self,
        client: &reqwest::Client,
        paths: &Paths,
        cfg: &ConfigStore,
        identity: &dyn SystemIdentity,
        destination_override: Option<&str>,
    ) -> DownloadOutcome {
        let dest = destination_override.or(self.destination.as_deref());
        downloader::get(client, paths, cfg, identity, &self.source, dest, self.options.clone()).await
    }
}

/// `{source: {prefix?, identifier, suffix?}, destination?, ...}` (spec §3, §4.3).
#[derive(Debug, Clone)]
pub struct DynamicUrl {
    url: Url,
}

impl DynamicUrl {
    /// Construct and eagerly resolve the identifier (spec §4.3: "identifier
    /// is resolved once at construction; if unresolved, construction fails").
    pub async fn from_value<C: Clock>(
        value: &Value,
        destination: Option<&str>,
        client: &reqwest::Client,
        paths: &Paths,
        cfg: &ConfigStore,
        identity: &dyn SystemIdentity,
        clock: &C,
    ) -> Result<Self, UrlShapeError> {
        let obj = value.as_object().ok_or(UrlShapeError::MissingSource)?;
        let source_spec = obj.get("source").and_then(Value::as_object).ok_or(UrlShapeError::MissingSource)?;

        let prefix = match source_spec.get("prefix") {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(UrlShapeError::PrefixNotString),
        };
        let suffix = match source_spec.get("suffix") {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(UrlShapeError::SuffixNotString),
        };

        let identifier_value = source_spec.get("identifier").ok_or(UrlShapeError::MissingIdentifier)?;
        let identifier_spec =
            IdentifierSpec::from_value(identifier_value).ok_or(UrlShapeError::MissingIdentifier)?;
        let identifier = identifier::resolve(&identifier_spec, client, paths, cfg, identity, clock)
            .await
            .ok_or(UrlShapeError::IdentifierUnresolved)?;

        let source = format!("{prefix}{identifier}{suffix}");

        let payload_dest = match obj.get("destination") {
            None => destination.map(str::to_string),
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(UrlShapeError::DestinationNotString),
        };

        let options = DownloadOptions {
            include_http_headers: field_bool(obj, "include-http-headers"),
            secure: field_bool(obj, "secure"),
            timeout_secs: field_u64(obj, "timeout"),
            retries: None,
            curl_arguments: field_string(obj, "curl-arguments"),
        };

        Ok(Self { url: Url { source, destination: payload_dest, options } })
    }

    pub fn source(&self) -> &str {
        self.url.source()
    }

    pub async fn download(
        &self,
        client: &reqwest::Client,
        paths: &Paths,
        cfg: &ConfigStore,
        identity: &dyn SystemIdentity,
        destination_override: Option<&str>,
    ) -> DownloadOutcome {
        self.url.download(client, paths, cfg, identity, destination_override).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_string_url_means_source_only() {
        let url = Url::from_value(&json!("http://host/a.json"), None).expect("parse");
        assert_eq!(url.source(), "http://host/a.json");
    }

    #[test]
    fn object_without_source_fails() {
        let err = Url::from_value(&json!({"destination": "x"}), None).unwrap_err();
        assert!(matches!(err, UrlShapeError::MissingSource));
    }

    #[test]
    fn payload_destination_overrides_constructor_default() {
        let url = Url::from_value(&json!({"source": "http://host/a.json", "destination": "/tmp/a"}), Some("/tmp/b"))
            .expect("parse");
        assert_eq!(url.destination.as_deref(), Some("/tmp/a"));
    }

    #[test]
    fn constructor_destination_used_when_payload_omits_it() {
        let url = Url::from_value(&json!({"source": "http://host/a.json"}), Some("/tmp/b")).expect("parse");
        assert_eq!(url.destination.as_deref(), Some("/tmp/b"));
    }

    #[test]
    fn non_string_destination_is_rejected() {
        let err = Url::from_value(&json!({"source": "http://host/a.json", "destination": 5}), None).unwrap_err();
        assert!(matches!(err, UrlShapeError::DestinationNotString));
    }
}
