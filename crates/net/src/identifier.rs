// SPDX-License-Identifier: MIT

//! The Identifier Resolver (component C2, spec §4.2).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use ztp_config::ConfigStore;
use ztp_core::{Clock, Paths};

use crate::downloader;
use crate::identity::SystemIdentity;
use crate::url::Url;

/// Raw `identifier` field from a dynamic URL's `source` object: either one
/// of the reserved tags, a literal passthrough string, or `{url}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdentifierSpec {
    Tag(String),
    Url { url: Value },
}

impl IdentifierSpec {
    pub fn from_value(v: &Value) -> Option<Self> {
        serde_json::from_value(v.clone()).ok()
    }
}

/// Resolve an [`IdentifierSpec`] to a concrete string (spec §4.2). Returns
/// `None` when the input can't be resolved: an unrecognized script download
/// failure, a non-zero script exit, or a malformed `{url}` shape.
pub async fn resolve<C: Clock>(
    spec: &IdentifierSpec,
    client: &reqwest::Client,
    paths: &Paths,
    cfg: &ConfigStore,
    identity: &dyn SystemIdentity,
    clock: &C,
) -> Option<String> {
    match spec {
        IdentifierSpec::Tag(tag) => resolve_tag(tag, identity),
        IdentifierSpec::Url { url } => resolve_script(url, client, paths, cfg, identity, clock).await,
    }
}

fn resolve_tag(tag: &str, identity: &dyn SystemIdentity) -> Option<String> {
    match tag {
        "hostname" => identity.hostname(),
        "hostname-fqdn" => identity.hostname_fqdn(),
        "serial-number" => identity.serial_number(),
        "product-name" => identity.product_name(),
        "mac" => identity.mac_addr(),
        "sonic-version" => identity.sonic_version(),
        // Any other non-reserved string passes through verbatim.
        other => Some(other.to_string()),
    }
}

async fn resolve_script<C: Clock>(
    url_value: &Value,
    client: &reqwest::Client,
    paths: &Paths,
    cfg: &ConfigStore,
    identity: &dyn SystemIdentity,
    clock: &C,
) -> Option<String> {
    let Ok(url) = Url::from_value(url_value, None) else {
        debug!("identifier {{url}} shape is invalid");
        return None;
    };

    let tmp_name = format!("identifier_{}", uuid::Uuid::new_v4());
    let dst = paths.ztp_tmp.join(tmp_name);
    ztp_core::update_activity(&paths.ztp_activity, clock, &format!("Downloading identifier script from '{}'", url.source()));

    let (code, downloaded) = url.download(client, paths, cfg, identity, Some(dst.to_string_lossy().as_ref())).await;
    let path = downloaded.filter(|_| code == downloader::CODE_SUCCESS)?;

    if !path.exists() {
        return None;
    }

    ztp_core::update_activity(&paths.ztp_activity, clock, &format!("Executing identifier script downloaded from '{}'", url.source()));
    set_executable(&path).ok()?;

    let output = tokio::process::Command::new(&path).output().await.ok()?;
    if !output.status.success() {
        debug!(path = %path.display(), code = output.status.code(), "identifier script exited non-zero");
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    Some(stdout.lines().next().unwrap_or("").to_string())
}

fn set_executable(path: &std::path::Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
}

/// Convenience used by `DynamicUrl` when the overhead of an async download
/// is needed only for the `{url}` shape; tags resolve synchronously.
pub fn resolve_tag_only(spec: &IdentifierSpec, identity: &dyn SystemIdentity) -> Option<String> {
    match spec {
        IdentifierSpec::Tag(tag) => resolve_tag(tag, identity),
        IdentifierSpec::Url { .. } => None,
    }
}
