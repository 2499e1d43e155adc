// SPDX-License-Identifier: MIT

//! Policy-flag three-level lookup (spec §9 design note: "Inheritance of
//! defaults (document -> section -> built-in): model as a three-level
//! lookup function, not as class inheritance.").

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ztp_config::{coerce_bool, ConfigStore};

/// The seven policy flags shared by the document envelope and every section
/// (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PolicyFlags {
    #[serde(rename = "ignore-result")]
    pub ignore_result: bool,
    #[serde(rename = "reboot-on-success")]
    pub reboot_on_success: bool,
    #[serde(rename = "reboot-on-failure")]
    pub reboot_on_failure: bool,
    #[serde(rename = "halt-on-failure")]
    pub halt_on_failure: bool,
    #[serde(rename = "restart-ztp-on-failure")]
    pub restart_ztp_on_failure: bool,
    #[serde(rename = "restart-ztp-no-config")]
    pub restart_ztp_no_config: bool,
    #[serde(rename = "config-fallback")]
    pub config_fallback: bool,
}

/// Resolve the policy flags present in `obj`, falling back to `upstream`
/// (the document's own resolved flags, when resolving a section) and then
/// to the Config Store's built-in defaults.
pub fn resolve(obj: &Map<String, Value>, upstream: Option<PolicyFlags>, cfg: &ConfigStore) -> PolicyFlags {
    let field = |key: &str, up: bool| -> bool {
        obj.get(key).and_then(coerce_bool).unwrap_or(up)
    };
    let default_of = |key: &str| cfg.get_bool(key).unwrap_or(false);

    match upstream {
        Some(up) => PolicyFlags {
            ignore_result: field("ignore-result", up.ignore_result),
            reboot_on_success: field("reboot-on-success", up.reboot_on_success),
            reboot_on_failure: field("reboot-on-failure", up.reboot_on_failure),
            halt_on_failure: field("halt-on-failure", up.halt_on_failure),
            restart_ztp_on_failure: field("restart-ztp-on-failure", up.restart_ztp_on_failure),
            restart_ztp_no_config: field("restart-ztp-no-config", up.restart_ztp_no_config),
            config_fallback: field("config-fallback", up.config_fallback),
        },
        None => PolicyFlags {
            ignore_result: field("ignore-result", default_of("ignore-result")),
            reboot_on_success: field("reboot-on-success", default_of("reboot-on-success")),
            reboot_on_failure: field("reboot-on-failure", default_of("reboot-on-failure")),
            halt_on_failure: field("halt-on-failure", default_of("halt-on-failure")),
            restart_ztp_on_failure: field("restart-ztp-on-failure", default_of("restart-ztp-on-failure")),
            restart_ztp_no_config: field("restart-ztp-no-config", default_of("restart-ztp-no-config")),
            config_fallback: field("config-fallback", default_of("config-fallback")),
        },
    }
}

pub const POLICY_KEYS: [&str; 7] = [
    "ignore-result",
    "reboot-on-success",
    "reboot-on-failure",
    "halt-on-failure",
    "restart-ztp-on-failure",
    "restart-ztp-no-config",
    "config-fallback",
];
