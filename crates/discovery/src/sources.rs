// SPDX-License-Identifier: MIT

//! Ranked provisioning-source probing (spec §4.8 precedence table).

use std::path::{Path, PathBuf};

use serde_json::json;
use tracing::{debug, warn};
use ztp_config::ConfigStore;
use ztp_core::Paths;
use ztp_net::{downloader, DownloadOptions, SystemIdentity};

use crate::error::DiscoveryError;

/// What discovery found, in precedence order (spec §4.8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceHit {
    /// A provisioning document is available at `path`; hand it to the
    /// document loader. `mode` is the source name recorded for operator
    /// visibility (the source implementation's `ztp_mode`).
    Document { mode: &'static str, path: PathBuf },
    /// Manual configuration already exists and `monitor-startup-config` is
    /// enabled: ZTP is not needed this boot (spec §4.8 rank 2).
    ManualConfigPresent,
}

async fn read_first_line(path: &Path) -> Option<String> {
    let content = tokio::fs::read_to_string(path).await.ok()?;
    let line = content.lines().next()?.trim();
    if line.is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok()
}

async fn download_to(
    client: &reqwest::Client,
    paths: &Paths,
    cfg: &ConfigStore,
    identity: &dyn SystemIdentity,
    source: &str,
    destination: &Path,
) -> bool {
    let dest = destination.to_string_lossy().to_string();
    let (code, _) = downloader::get(client, paths, cfg, identity, source, Some(&dest), DownloadOptions::default()).await;
    code == 0
}

/// Synthesize a 1-section document wrapping a downloaded shell script as the
/// `provisioning-script` plugin (spec §4.8 ranks 6/7, grounded on the
/// source's `__createProvScriptJson`).
async fn synthesize_provisioning_script(
    paths: &Paths,
    cfg: &ConfigStore,
    client: &reqwest::Client,
    identity: &dyn SystemIdentity,
    script_url: &str,
) -> Result<bool, DiscoveryError> {
    if !download_to(client, paths, cfg, identity, script_url, &paths.provisioning_script).await {
        return Ok(false);
    }

    let doc = json!({
        "ztp": {
            "provisioning-script": {
                "plugin": {
                    "url": format!("file://{}", paths.provisioning_script.display()),
                    "ignore-section-data": true,
                },
            },
            "restart-ztp-no-config": false,
        }
    });

    ztp_core::atomic_write_json(&paths.ztp_json, &doc)
        .map_err(|source| DiscoveryError::Io { path: paths.ztp_json.clone(), source })?;
    Ok(true)
}

/// Synthesize a `graphservice` section document from the minigraph/ACL URL
/// files (spec §4.8 rank 8, grounded on `__createGraphserviceJson`).
async fn synthesize_graphservice(
    paths: &Paths,
    cfg: &ConfigStore,
    client: &reqwest::Client,
    identity: &dyn SystemIdentity,
) -> Result<bool, DiscoveryError> {
    let Some(minigraph_url) = read_first_line(&paths.graph_url).await else { return Ok(false) };

    let probe_dest = paths.ztp_tmp.join("minigraph-probe.xml");
    if !download_to(client, paths, cfg, identity, &minigraph_url, &probe_dest).await {
        return Ok(false);
    }
    tokio::fs::remove_file(&probe_dest).await.ok();

    let mut graphservice = serde_json::Map::new();
    graphservice.insert("minigraph-url".to_string(), json!({ "url": minigraph_url }));

    if exists(&paths.acl_url).await {
        let Some(acl_url) = read_first_line(&paths.acl_url).await else { return Ok(false) };
        let probe_dest = paths.ztp_tmp.join("acl-probe.json");
        if !download_to(client, paths, cfg, identity, &acl_url, &probe_dest).await {
            return Ok(false);
        }
        tokio::fs::remove_file(&probe_dest).await.ok();
        graphservice.insert("acl-url".to_string(), json!({ "url": acl_url }));
    }

    let doc = json!({
        "ztp": {
            "graphservice": graphservice,
            "restart-ztp-no-config": false,
        }
    });

    ztp_core::atomic_write_json(&paths.ztp_json, &doc)
        .map_err(|source| DiscoveryError::Io { path: paths.ztp_json.clone(), source })?;
    Ok(true)
}

/// Probe every source in precedence order, stopping at the first hit (spec
/// §4.8). Returns `None` on a full miss, meaning the caller should install
/// the discovery profile, run a link scan, and sleep.
pub async fn probe(
    paths: &Paths,
    cfg: &ConfigStore,
    client: &reqwest::Client,
    identity: &dyn SystemIdentity,
) -> Result<Option<SourceHit>, DiscoveryError> {
    if exists(&paths.ztp_json).await {
        return Ok(Some(SourceHit::Document { mode: "existing", path: paths.ztp_json.clone() }));
    }

    let monitor_startup_config = cfg.get_bool("monitor-startup-config").unwrap_or(true);
    if monitor_startup_config && exists(&paths.config_db_json).await {
        return Ok(Some(SourceHit::ManualConfigPresent));
    }

    if exists(&paths.ztp_json_local).await {
        return Ok(Some(SourceHit::Document { mode: "local-fs", path: paths.ztp_json_local.clone() }));
    }

    if let Some(raw) = read_first_line(&paths.opt67_url).await {
        let tftp_hint = read_first_line(&paths.opt66_tftp_server).await;
        let rewritten = downloader::rewrite_tftp_scheme(&raw, tftp_hint.as_deref());
        if download_to(client, paths, cfg, identity, &rewritten, &paths.ztp_json_opt67).await {
            return Ok(Some(SourceHit::Document { mode: "dhcp-opt67", path: paths.ztp_json_opt67.clone() }));
        }
        warn!(url = rewritten, "dhcp-opt67 download failed, continuing discovery");
    }

    if let Some(raw) = read_first_line(&paths.opt59_v6_url).await {
        if download_to(client, paths, cfg, identity, &raw, &paths.ztp_json_opt59).await {
            return Ok(Some(SourceHit::Document { mode: "dhcp6-opt59", path: paths.ztp_json_opt59.clone() }));
        }
        warn!(url = raw, "dhcp6-opt59 download failed, continuing discovery");
    }

    if let Some(raw) = read_first_line(&paths.opt239_url).await {
        if synthesize_provisioning_script(paths, cfg, client, identity, &raw).await? {
            return Ok(Some(SourceHit::Document { mode: "dhcp-opt239", path: paths.ztp_json.clone() }));
        }
    }

    if let Some(raw) = read_first_line(&paths.opt239_v6_url).await {
        if synthesize_provisioning_script(paths, cfg, client, identity, &raw).await? {
            return Ok(Some(SourceHit::Document { mode: "dhcp6-opt239", path: paths.ztp_json.clone() }));
        }
    }

    if exists(&paths.graph_url).await && synthesize_graphservice(paths, cfg, client, identity).await? {
        return Ok(Some(SourceHit::Document { mode: "dhcp-opt225-graph-url", path: paths.ztp_json.clone() }));
    }

    debug!("discovery probe completed with no source hit");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ztp_net::FakeSystemIdentity;

    #[tokio::test]
    async fn existing_document_wins_over_every_other_source() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(dir.path());
        tokio::fs::create_dir_all(paths.ztp_json.parent().expect("parent")).await.expect("mkdir");
        tokio::fs::write(&paths.ztp_json, b"{}").await.expect("write");
        tokio::fs::create_dir_all(paths.config_db_json.parent().expect("parent")).await.expect("mkdir");
        tokio::fs::write(&paths.config_db_json, b"{}").await.expect("write");

        let cfg = ConfigStore::empty();
        let client = reqwest::Client::new();
        let identity = FakeSystemIdentity::default();

        let hit = probe(&paths, &cfg, &client, &identity).await.expect("probe");
        assert_eq!(hit, Some(SourceHit::Document { mode: "existing", path: paths.ztp_json.clone() }));
    }

    #[tokio::test]
    async fn manual_config_present_short_circuits_when_no_document_exists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(dir.path());
        tokio::fs::create_dir_all(paths.config_db_json.parent().expect("parent")).await.expect("mkdir");
        tokio::fs::write(&paths.config_db_json, b"{}").await.expect("write");

        let cfg = ConfigStore::empty();
        let client = reqwest::Client::new();
        let identity = FakeSystemIdentity::default();

        let hit = probe(&paths, &cfg, &client, &identity).await.expect("probe");
        assert_eq!(hit, Some(SourceHit::ManualConfigPresent));
    }

    #[tokio::test]
    async fn local_document_is_adopted_when_nothing_higher_ranked_is_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(dir.path());
        tokio::fs::create_dir_all(paths.ztp_json_local.parent().expect("parent")).await.expect("mkdir");
        tokio::fs::write(&paths.ztp_json_local, b"{}").await.expect("write");

        let cfg = ConfigStore::empty();
        let client = reqwest::Client::new();
        let identity = FakeSystemIdentity::default();

        let hit = probe(&paths, &cfg, &client, &identity).await.expect("probe");
        assert_eq!(hit, Some(SourceHit::Document { mode: "local-fs", path: paths.ztp_json_local.clone() }));
    }

    #[tokio::test]
    async fn full_miss_returns_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(dir.path());
        let cfg = ConfigStore::empty();
        let client = reqwest::Client::new();
        let identity = FakeSystemIdentity::default();

        let hit = probe(&paths, &cfg, &client, &identity).await.expect("probe");
        assert_eq!(hit, None);
    }
}
