// SPDX-License-Identifier: MIT

//! `ztp` — the Engine Supervisor binary (component C9). Grounded on the
//! source's `ztp-engine.py main()`/`executeLoop` for the `run` subcommand,
//! and on the daemon binary's startup sequencing (root check, working
//! directories, logging, signal handlers before entering the main loop).

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod cli;
mod commands;
mod logging;
mod restart;
mod signals;
mod supervisor;

use clap::Parser;
use serde_json::json;
use tracing::{error, info};
use ztp_config::ConfigStore;
use ztp_core::{PidRegistry, SystemClock};
use ztp_discovery::{NullLinkScanner, ShellProfileInstaller};
use ztp_net::OsSystemIdentity;

use cli::{Cli, Command};
use supervisor::Supervisor;

fn ensure_working_dirs(paths: &ztp_core::Paths) -> std::io::Result<()> {
    for dir in [&paths.ztp_cfg_dir, &paths.ztp_run_dir, &paths.ztp_tmp, &paths.ztp_tmp_persistent] {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

fn load_config(paths: &ztp_core::Paths, config_json: Option<&std::path::Path>) -> Result<ConfigStore, anyhow::Error> {
    let path = config_json.unwrap_or(&paths.ztp_cfg_file);
    ConfigStore::load(path).map_err(Into::into)
}

async fn run_supervisor(debug: bool, test: bool, config_json: Option<std::path::PathBuf>) -> i32 {
    let paths = ztp_core::Paths::default();

    if !test && !nix::unistd::Uid::effective().is_root() {
        eprintln!("ztp: must be run as root");
        return 1;
    }

    if let Err(err) = ensure_working_dirs(&paths) {
        eprintln!("ztp: failed to create working directories: {err}");
        return 1;
    }

    let mut cfg = match load_config(&paths, config_json.as_deref()) {
        Ok(c) => c,
        Err(err) => {
            eprintln!("ztp: failed to load configuration: {err}");
            return 1;
        }
    };
    if test {
        if let Err(err) = cfg.set("test-mode", json!(true)) {
            eprintln!("ztp: failed to apply test-mode override: {err}");
            return 1;
        }
    }

    let log_path = paths.ztp_run_dir.join("ztp.log");
    let _log_guard = match logging::init(Some(&log_path), debug) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("ztp: failed to initialize logging: {err}");
            return 1;
        }
    };

    info!(test_mode = test, "ztp supervisor starting");

    let registry = PidRegistry::new();
    let clock = SystemClock;
    let wait_secs = cfg.get_i64("sighandler-wait-interval").unwrap_or(60).max(0) as u64;

    if !test {
        tokio::spawn(signals::run(registry.clone(), clock, paths.ztp_activity.clone(), wait_secs));
    }

    let profile: Box<dyn ztp_discovery::ProfileInstaller> = if test {
        Box::new(ztp_discovery::FakeProfileInstaller::default())
    } else {
        Box::new(ShellProfileInstaller::new(&paths.ztp_lib_dir))
    };

    let mut sup = Supervisor {
        paths,
        cfg,
        client: reqwest::Client::new(),
        identity: Box::new(OsSystemIdentity),
        registry,
        clock,
        profile,
        link_scanner: Box::new(NullLinkScanner),
        test_mode: test,
    };

    let code = sup.run().await;
    info!(code, "ztp supervisor exiting");
    code
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let code = match cli.command {
        Command::Run { debug, test, config_json } => run_supervisor(debug, test, config_json).await,
        Command::Status => {
            let paths = ztp_core::Paths::default();
            commands::status(&paths)
        }
        Command::Erase => {
            let paths = ztp_core::Paths::default();
            commands::erase(&paths)
        }
        Command::Enable => {
            let paths = ztp_core::Paths::default();
            commands::enable(&paths)
        }
        Command::Disable => {
            let paths = ztp_core::Paths::default();
            commands::disable(&paths)
        }
    };

    if code != 0 {
        error!(code, "ztp exiting with non-zero status");
    }
    std::process::exit(code);
}
