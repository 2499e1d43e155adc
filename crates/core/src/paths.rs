// SPDX-License-Identifier: MIT

//! Centralized filesystem layout (spec §6 "Source discovery files" table).
//!
//! Generalizes the source implementation's scattered path constants
//! (`defaults.py`) into a single struct threaded through every component,
//! per spec §9's `Context{config, log, paths}` design note.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Every configurable path the engine reads or writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Paths {
    pub ztp_cfg_dir: PathBuf,
    pub ztp_lib_dir: PathBuf,
    pub ztp_run_dir: PathBuf,
    pub ztp_tmp: PathBuf,
    pub ztp_tmp_persistent: PathBuf,
    pub plugins_dir: PathBuf,

    pub ztp_json: PathBuf,
    pub ztp_json_shadow: PathBuf,
    pub ztp_json_local: PathBuf,
    pub ztp_restart_flag: PathBuf,
    pub ztp_activity: PathBuf,
    pub ztp_cfg_file: PathBuf,

    pub opt67_url: PathBuf,
    pub opt59_v6_url: PathBuf,
    pub opt66_tftp_server: PathBuf,
    pub opt239_url: PathBuf,
    pub opt239_v6_url: PathBuf,
    pub graph_url: PathBuf,
    pub acl_url: PathBuf,

    /// Downloaded provisioning-script destination (DHCP options 239/239v6).
    pub provisioning_script: PathBuf,
    /// Staging destination for a DHCPv4 option 67 download (spec §4.8 rank 4).
    pub ztp_json_opt67: PathBuf,
    /// Staging destination for a DHCPv6 option 59 download (spec §4.8 rank 5).
    pub ztp_json_opt59: PathBuf,
    /// Persisted startup configuration; its presence is the "manual
    /// configuration present" discovery source (spec §4.8 rank 2).
    pub config_db_json: PathBuf,

    pub section_input_file: String,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            ztp_cfg_dir: PathBuf::from("/host/ztp"),
            ztp_lib_dir: PathBuf::from("/usr/lib/ztp"),
            ztp_run_dir: PathBuf::from("/var/run/ztp"),
            ztp_tmp: PathBuf::from("/var/lib/ztp/tmp"),
            ztp_tmp_persistent: PathBuf::from("/var/lib/ztp/sections"),
            plugins_dir: PathBuf::from("/usr/lib/ztp/plugins"),

            ztp_json: PathBuf::from("/host/ztp/ztp_data.json"),
            ztp_json_shadow: PathBuf::from("/host/ztp/ztp_data_shadow.json"),
            ztp_json_local: PathBuf::from("/host/ztp/ztp_data_local.json"),
            ztp_restart_flag: PathBuf::from("/tmp/pending_ztp_restart"),
            ztp_activity: PathBuf::from("/var/run/ztp/activity"),
            ztp_cfg_file: PathBuf::from("/host/ztp/ztp_cfg.json"),

            opt67_url: PathBuf::from("/var/run/ztp/dhcp_67-ztp_data_url"),
            opt59_v6_url: PathBuf::from("/var/run/ztp/dhcp6_59-ztp_data_url"),
            opt66_tftp_server: PathBuf::from("/var/run/ztp/dhcp_66-ztp_tftp_server"),
            opt239_url: PathBuf::from("/var/run/ztp/dhcp_239-provisioning-script_url"),
            opt239_v6_url: PathBuf::from("/var/run/ztp/dhcp6_239-provisioning-script_url"),
            graph_url: PathBuf::from("/var/run/ztp/dhcp_graph_url"),
            acl_url: PathBuf::from("/var/run/ztp/dhcp_acl_url"),

            provisioning_script: PathBuf::from("/host/ztp/provisioning-script"),
            ztp_json_opt67: PathBuf::from("/var/run/ztp/ztp_data_opt67.json"),
            ztp_json_opt59: PathBuf::from("/var/run/ztp/ztp_data_opt59.json"),
            config_db_json: PathBuf::from("/etc/sonic/config_db.json"),

            section_input_file: "input.json".to_string(),
        }
    }
}

impl Paths {
    /// Build a `Paths` rooted under `root` for tests — every absolute path
    /// above gets rebased under a tempdir instead of `/host`, `/var`, etc.
    pub fn rooted_at(root: &Path) -> Self {
        let rebase = |p: &Path| root.join(p.strip_prefix("/").unwrap_or(p));
        let defaults = Self::default();
        Self {
            ztp_cfg_dir: rebase(&defaults.ztp_cfg_dir),
            ztp_lib_dir: rebase(&defaults.ztp_lib_dir),
            ztp_run_dir: rebase(&defaults.ztp_run_dir),
            ztp_tmp: rebase(&defaults.ztp_tmp),
            ztp_tmp_persistent: rebase(&defaults.ztp_tmp_persistent),
            plugins_dir: rebase(&defaults.plugins_dir),
            ztp_json: rebase(&defaults.ztp_json),
            ztp_json_shadow: rebase(&defaults.ztp_json_shadow),
            ztp_json_local: rebase(&defaults.ztp_json_local),
            ztp_restart_flag: rebase(&defaults.ztp_restart_flag),
            ztp_activity: rebase(&defaults.ztp_activity),
            ztp_cfg_file: rebase(&defaults.ztp_cfg_file),
            opt67_url: rebase(&defaults.opt67_url),
            opt59_v6_url: rebase(&defaults.opt59_v6_url),
            opt66_tftp_server: rebase(&defaults.opt66_tftp_server),
            opt239_url: rebase(&defaults.opt239_url),
            opt239_v6_url: rebase(&defaults.opt239_v6_url),
            graph_url: rebase(&defaults.graph_url),
            acl_url: rebase(&defaults.acl_url),
            provisioning_script: rebase(&defaults.provisioning_script),
            ztp_json_opt67: rebase(&defaults.ztp_json_opt67),
            ztp_json_opt59: rebase(&defaults.ztp_json_opt59),
            config_db_json: rebase(&defaults.config_db_json),
            section_input_file: defaults.section_input_file,
        }
    }

    /// Directory holding a section's split-out files (`<tmp-persistent>/<name>/`).
    pub fn section_dir(&self, section_name: &str) -> PathBuf {
        self.ztp_tmp_persistent.join(section_name)
    }

    /// `<tmp-persistent>/<name>/input.json`.
    pub fn section_input_path(&self, section_name: &str) -> PathBuf {
        self.section_dir(section_name).join(&self.section_input_file)
    }

    /// `<tmp-persistent>/<name>/plugin` — cached downloaded plugin (spec §4.6 step 1).
    pub fn section_plugin_cache(&self, section_name: &str) -> PathBuf {
        self.section_dir(section_name).join("plugin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_paths_stay_under_root() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = Paths::rooted_at(dir.path());
        assert!(paths.ztp_json.starts_with(dir.path()));
        assert!(paths.plugins_dir.starts_with(dir.path()));
    }

    #[test]
    fn section_paths_nest_under_tmp_persistent() {
        let paths = Paths::default();
        assert_eq!(paths.section_input_path("0001-firmware"), paths.ztp_tmp_persistent.join("0001-firmware/input.json"));
        assert_eq!(paths.section_plugin_cache("0001-firmware"), paths.ztp_tmp_persistent.join("0001-firmware/plugin"));
    }
}
