// SPDX-License-Identifier: MIT

//! ProvisioningDocument (spec §3) and the loader algorithm (spec §4.5).

use std::collections::BTreeMap;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{info, warn};
use ztp_config::ConfigStore;
use ztp_core::{Clock, DocumentStatus, Paths};
use ztp_net::{DynamicUrl, SystemIdentity, Url};

use crate::error::DocumentError;
use crate::policy::{self, PolicyFlags, POLICY_KEYS};
use crate::section::Section;
use crate::split;

/// Envelope keys that are never mistaken for a section, even when their
/// value happens to be a JSON object (spec §3, §4.5 step 6/8).
const RESERVED_ENVELOPE_KEYS: [&str; 7] =
    ["url", "dynamic-url", "ztp-json-version", "ztp-json-source", "status", "timestamp", "start-timestamp"];

/// The top-level provisioning document (spec §3).
#[derive(Debug, Clone)]
pub struct ProvisioningDocument {
    pub status: DocumentStatus,
    pub start_timestamp: Option<String>,
    pub timestamp: Option<String>,
    pub ztp_json_source: Option<String>,
    pub ztp_json_version: String,
    pub policy: PolicyFlags,
    pub sections: BTreeMap<String, Section>,
    /// Any envelope key not modeled above, preserved untouched.
    pub extra: Map<String, Value>,
}

impl ProvisioningDocument {
    /// Sorted section names (spec §4.5 `section_names()`).
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }

    /// Re-render the full working document back to JSON (`{"ztp": {...}}`).
    pub fn to_value(&self) -> Value {
        let mut env = self.extra.clone();
        env.insert("status".to_string(), Value::String(self.status.to_string()));
        if let Some(ts) = &self.start_timestamp {
            env.insert("start-timestamp".to_string(), Value::String(ts.clone()));
        }
        if let Some(ts) = &self.timestamp {
            env.insert("timestamp".to_string(), Value::String(ts.clone()));
        }
        if let Some(src) = &self.ztp_json_source {
            env.insert("ztp-json-source".to_string(), Value::String(src.clone()));
        }
        env.insert("ztp-json-version".to_string(), Value::String(self.ztp_json_version.clone()));
        env.insert("ignore-result".to_string(), Value::Bool(self.policy.ignore_result));
        env.insert("reboot-on-success".to_string(), Value::Bool(self.policy.reboot_on_success));
        env.insert("reboot-on-failure".to_string(), Value::Bool(self.policy.reboot_on_failure));
        env.insert("halt-on-failure".to_string(), Value::Bool(self.policy.halt_on_failure));
        env.insert("restart-ztp-on-failure".to_string(), Value::Bool(self.policy.restart_ztp_on_failure));
        env.insert("restart-ztp-no-config".to_string(), Value::Bool(self.policy.restart_ztp_no_config));
        env.insert("config-fallback".to_string(), Value::Bool(self.policy.config_fallback));
        for (name, section) in &self.sections {
            env.insert(name.clone(), section.to_value());
        }
        let mut top = Map::new();
        top.insert("ztp".to_string(), Value::Object(env));
        Value::Object(top)
    }

    /// Persist the working document and its shadow projection (spec §4.5 step 9).
    pub fn persist(&self, paths: &Paths) -> std::io::Result<()> {
        ztp_core::atomic_write_json(&paths.ztp_json, &self.to_value())?;
        ztp_core::atomic_write_json(&paths.ztp_json_shadow, &crate::shadow::project(self))?;
        Ok(())
    }
}

fn extract_env(top: &Value) -> Result<Map<String, Value>, DocumentError> {
    let env = top.as_object().and_then(|m| m.get("ztp")).ok_or(DocumentError::MissingZtpRoot)?;
    env.as_object().cloned().ok_or(DocumentError::EnvelopeNotObject)
}

async fn read_and_parse(path: &Path) -> Result<Value, DocumentError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| DocumentError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_str(&raw).map_err(|source| DocumentError::Parse { path: path.to_path_buf(), source })
}

/// Download a redirect envelope (`url` or `dynamic-url`) over `path`, once.
async fn follow_redirect<C: Clock>(
    env: &Map<String, Value>,
    path: &Path,
    client: &reqwest::Client,
    paths: &Paths,
    cfg: &ConfigStore,
    identity: &dyn SystemIdentity,
    clock: &C,
) -> Result<(), DocumentError> {
    let dest = path.to_string_lossy().to_string();

    let outcome = if let Some(dynamic) = env.get("dynamic-url") {
        let durl = DynamicUrl::from_value(dynamic, Some(&dest), client, paths, cfg, identity, clock).await?;
        durl.download(client, paths, cfg, identity, Some(&dest)).await
    } else {
        let url = Url::from_value(&env["url"], Some(&dest))?;
        url.download(client, paths, cfg, identity, Some(&dest)).await
    };

    match outcome {
        (0, Some(_)) => Ok(()),
        (code, _) => Err(DocumentError::RedirectDownloadFailed { code }),
    }
}

/// `Load(path) -> Document` (spec §4.5).
pub async fn load<C: Clock>(
    path: &Path,
    client: &reqwest::Client,
    paths: &Paths,
    cfg: &ConfigStore,
    identity: &dyn SystemIdentity,
    clock: &C,
) -> Result<ProvisioningDocument, DocumentError> {
    let mut top = read_and_parse(path).await?;
    let mut env = extract_env(&top)?;

    if env.contains_key("url") || env.contains_key("dynamic-url") {
        follow_redirect(&env, path, client, paths, cfg, identity, clock).await?;
        top = read_and_parse(path).await?;
        env = extract_env(&top)?;
        // Spec §4.5 step 2: only one level of envelope redirection is
        // honored, even if the re-fetched document itself redirects.
        // Spec §9 open question: redirect wins, any inline sections in the
        // original envelope are discarded — we never merge `env` here.
    }

    let ztp_json_version = env
        .get("ztp-json-version")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| cfg.get_string("ztp-json-version").unwrap_or_else(|| "1.0".to_string()));

    let doc_policy = policy::resolve(&env, None, cfg);

    let (status, timestamp) = match env.get("status").and_then(Value::as_str) {
        None => (DocumentStatus::Boot, Some(clock.now_iso())),
        Some(raw) => match DocumentStatus::parse(raw) {
            Some(s) => (s, env.get("timestamp").and_then(Value::as_str).map(str::to_string)),
            None => {
                warn!(status = raw, "invalid document status, forcing FAILED");
                (DocumentStatus::Failed, Some(clock.now_iso()))
            }
        },
    };

    let start_timestamp = env.get("start-timestamp").and_then(Value::as_str).map(str::to_string);
    let ztp_json_source = env.get("ztp-json-source").and_then(Value::as_str).map(str::to_string);

    let mut sections = BTreeMap::new();
    for (key, value) in &env {
        if RESERVED_ENVELOPE_KEYS.contains(&key.as_str()) || POLICY_KEYS.contains(&key.as_str()) {
            continue;
        }
        if value.is_object() {
            let section = Section::from_value(key, value, doc_policy, cfg)?;
            sections.insert(key.clone(), section);
        }
    }

    let mut extra = env.clone();
    for key in RESERVED_ENVELOPE_KEYS.into_iter().chain(POLICY_KEYS) {
        extra.remove(key);
    }
    for name in sections.keys() {
        extra.remove(name);
    }

    let doc = ProvisioningDocument {
        status,
        start_timestamp,
        timestamp,
        ztp_json_source,
        ztp_json_version,
        policy: doc_policy,
        sections,
        extra,
    };

    if doc.status == DocumentStatus::Boot {
        for dir in [&paths.ztp_tmp, &paths.ztp_tmp_persistent] {
            if dir.exists() {
                tokio::fs::remove_dir_all(dir).await.map_err(DocumentError::Io2)?;
            }
            tokio::fs::create_dir_all(dir).await.map_err(DocumentError::Io2)?;
        }
    }

    split::split_sections(paths, &doc.sections).await.map_err(DocumentError::Io2)?;
    doc.persist(paths).map_err(DocumentError::Io2)?;
    info!(sections = doc.sections.len(), status = %doc.status, "provisioning document loaded");

    Ok(doc)
}
