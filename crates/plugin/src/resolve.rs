// SPDX-License-Identifier: MIT

//! Plugin Resolver (component C6, spec §4.6).

use std::path::PathBuf;

use regex::Regex;
use tracing::{debug, warn};
use ztp_config::ConfigStore;
use ztp_core::{Clock, Paths};
use ztp_document::{PluginSource, PluginSpec};
use ztp_net::{DynamicUrl, SystemIdentity, Url};

fn numeric_prefix() -> &'static Regex {
    static RE: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]+-").expect("static regex is valid"))
}

/// Strip a leading `[0-9]+-` prefix from a section name when deriving a
/// plugin name from it (spec §4.6 step 6).
pub fn strip_numeric_prefix(section_name: &str) -> String {
    numeric_prefix().replace(section_name, "").into_owned()
}

async fn literal_name_path(paths: &Paths, name: &str) -> Option<PathBuf> {
    let candidate = paths.plugins_dir.join(name);
    if tokio::fs::metadata(&candidate).await.is_ok() {
        Some(candidate)
    } else {
        debug!(name, path = %candidate.display(), "plugin not found in plugins directory");
        None
    }
}

/// Resolve the absolute executable path for a section, or `None` if it
/// can't be found or downloaded (spec §4.6).
pub async fn resolve<C: Clock>(
    section_name: &str,
    spec: &PluginSpec,
    client: &reqwest::Client,
    paths: &Paths,
    cfg: &ConfigStore,
    identity: &dyn SystemIdentity,
    clock: &C,
) -> Option<PathBuf> {
    let cache_path = paths.section_plugin_cache(section_name);
    if tokio::fs::metadata(&cache_path).await.is_ok() {
        debug!(section = section_name, "reusing cached plugin from a previous suspended pass");
        return Some(cache_path);
    }

    let cache_str = cache_path.to_string_lossy().to_string();

    match &spec.source {
        PluginSource::DynamicUrl(value) => {
            let durl = match DynamicUrl::from_value(value, Some(&cache_str), client, paths, cfg, identity, clock).await
            {
                Ok(d) => d,
                Err(e) => {
                    warn!(section = section_name, error = %e, "dynamic-url plugin construction failed");
                    return None;
                }
            };
            let (code, path) = durl.download(client, paths, cfg, identity, None).await;
            if code == 0 {
                path
            } else {
                None
            }
        }
        PluginSource::Url(value) => {
            let url = match Url::from_value(value, Some(&cache_str)) {
                Ok(u) => u,
                Err(e) => {
                    warn!(section = section_name, error = %e, "url plugin construction failed");
                    return None;
                }
            };
            let (code, path) = url.download(client, paths, cfg, identity, None).await;
            if code == 0 {
                path
            } else {
                None
            }
        }
        PluginSource::Name(name) => literal_name_path(paths, name).await,
        PluginSource::Absent => {
            let name = strip_numeric_prefix(section_name);
            literal_name_path(paths, &name).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_numeric_prefix() {
        assert_eq!(strip_numeric_prefix("0001-firmware"), "firmware");
    }

    #[test]
    fn leaves_name_without_numeric_prefix_unchanged() {
        assert_eq!(strip_numeric_prefix("firmware"), "firmware");
    }

    #[tokio::test]
    async fn cached_plugin_is_reused_without_consulting_the_spec() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(dir.path());
        let cache = paths.section_plugin_cache("0001-firmware");
        tokio::fs::create_dir_all(cache.parent().expect("parent")).await.expect("mkdir");
        tokio::fs::write(&cache, b"#!/bin/sh\n").await.expect("write");

        let cfg = ConfigStore::empty();
        let client = reqwest::Client::new();
        let identity = ztp_net::FakeSystemIdentity::default();
        let clock = ztp_core::FakeClock::default();
        let spec = PluginSpec::default();

        let resolved = resolve("0001-firmware", &spec, &client, &paths, &cfg, &identity, &clock).await;
        assert_eq!(resolved, Some(cache));
    }

    #[tokio::test]
    async fn absent_plugin_resolves_to_stripped_section_name_under_plugins_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(dir.path());
        tokio::fs::create_dir_all(&paths.plugins_dir).await.expect("mkdir");
        tokio::fs::write(paths.plugins_dir.join("firmware"), b"#!/bin/sh\n").await.expect("write");

        let cfg = ConfigStore::empty();
        let client = reqwest::Client::new();
        let identity = ztp_net::FakeSystemIdentity::default();
        let clock = ztp_core::FakeClock::default();
        let spec = PluginSpec::default();

        let resolved = resolve("0001-firmware", &spec, &client, &paths, &cfg, &identity, &clock).await;
        assert_eq!(resolved, Some(paths.plugins_dir.join("firmware")));
    }
}
