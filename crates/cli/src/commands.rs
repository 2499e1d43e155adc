// SPDX-License-Identifier: MIT

//! `ztp status` / `ztp erase` / `ztp enable` / `ztp disable` — the operator
//! surface kept out of scope for the engine itself (spec §1) but needed for
//! a complete supervisor binary.

use std::path::Path;

use serde_json::json;
use ztp_config::ConfigStore;
use ztp_core::Paths;

pub fn status(paths: &Paths) -> i32 {
    match std::fs::read_to_string(&paths.ztp_activity) {
        Ok(content) => {
            let line = content.lines().next().unwrap_or("").trim();
            if line.is_empty() {
                println!("ZTP status unknown: no activity recorded yet.");
            } else {
                println!("{line}");
            }
        }
        Err(_) => println!("ZTP status unknown: no activity recorded yet."),
    }
    0
}

fn remove_if_exists(path: &Path) {
    if path.exists() {
        let _ = std::fs::remove_file(path);
    }
}

/// Delete every persisted provisioning artifact so the next boot re-enters
/// discovery from a clean slate.
pub fn erase(paths: &Paths) -> i32 {
    remove_if_exists(&paths.ztp_json);
    remove_if_exists(&paths.ztp_json_shadow);
    remove_if_exists(&paths.ztp_json_local);
    remove_if_exists(&paths.ztp_restart_flag);
    let _ = std::fs::remove_dir_all(&paths.ztp_tmp);
    let _ = std::fs::remove_dir_all(&paths.ztp_tmp_persistent);
    println!("ZTP provisioning data erased.");
    0
}

fn set_admin_mode(paths: &Paths, enabled: bool) -> i32 {
    let mut cfg = match ConfigStore::load(&paths.ztp_cfg_file) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("failed to load ZTP configuration: {err}");
            return 1;
        }
    };
    if let Err(err) = cfg.set("admin-mode", json!(enabled)) {
        eprintln!("failed to set admin-mode: {err}");
        return 1;
    }
    if let Err(err) = cfg.save() {
        eprintln!("failed to save ZTP configuration: {err}");
        return 1;
    }
    // A stale restart flag from a previous `enable` would otherwise be
    // consumed by `executeLoop` as a spurious "ZTP restart requested" signal.
    remove_if_exists(&paths.ztp_restart_flag);
    println!("ZTP is now {}.", if enabled { "enabled" } else { "disabled" });
    0
}

pub fn enable(paths: &Paths) -> i32 {
    set_admin_mode(paths, true)
}

pub fn disable(paths: &Paths) -> i32 {
    set_admin_mode(paths, false)
}
