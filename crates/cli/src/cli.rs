// SPDX-License-Identifier: MIT

//! Command-line surface (spec §6 "External interfaces": CLI status/erase/
//! enable commands, argument parsing). Grounded on the source's
//! `argparse`-based `-d/-t/-C` flags plus the separate `ztp status|erase`
//! operator tools, unified here under one `clap` derive.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "ztp", version, about = "Zero-Touch Provisioning supervisor")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the discovery/provisioning supervisor loop (the default long-running daemon).
    Run {
        /// Enable debug-level logging.
        #[arg(short, long)]
        debug: bool,
        /// Test mode: skip privileged actions (reboot, profile install/remove, root check).
        #[arg(short, long)]
        test: bool,
        /// Load configuration overrides from a JSON file instead of the default config path.
        #[arg(short = 'C', long = "config-json")]
        config_json: Option<PathBuf>,
    },
    /// Print the last recorded activity line.
    Status,
    /// Erase all persisted provisioning data.
    Erase,
    /// Enable ZTP (set `admin-mode` true).
    Enable,
    /// Disable ZTP (set `admin-mode` false).
    Disable,
}
