// SPDX-License-Identifier: MIT

//! Plugin process execution (spec §4.7, §6 "Plugin invocation contract").
//!
//! Grounded on the spawn/reap pattern used for agent subprocesses in the
//! teacher repo: spawn, track the PID in a shared registry for the
//! supervisor's signal-drain loop, wait, untrack.

use std::process::Stdio;

use nix::sys::stat::{umask, Mode};
use tracing::warn;
use ztp_core::PidRegistry;

/// Outcome of running a plugin once.
#[derive(Debug, Clone)]
pub struct ExecOutcome {
    pub exit_code: Option<i32>,
    /// Set when the process could not even be spawned (spec §4.7:
    /// "Any process-spawn exception -> FAILED with the exception text").
    pub spawn_error: Option<String>,
}

fn parse_umask(raw: &str) -> Option<Mode> {
    u32::from_str_radix(raw, 8).ok().map(Mode::from_bits_truncate)
}

/// Execute `argv[0]` with the remaining elements as arguments (or, when
/// `shell` is true, the joined argv as a `/bin/sh -c` command line). stdin is
/// closed; stdout/stderr are inherited (spec §6: "not captured").
pub async fn run(registry: &PidRegistry, argv: &[String], shell: bool, umask_spec: Option<&str>) -> ExecOutcome {
    if argv.is_empty() {
        return ExecOutcome { exit_code: None, spawn_error: Some("empty argv".to_string()) };
    }

    let mut cmd = if shell {
        let mut c = tokio::process::Command::new("/bin/sh");
        c.arg("-c").arg(argv.join(" "));
        c
    } else {
        let mut c = tokio::process::Command::new(&argv[0]);
        c.args(&argv[1..]);
        c
    };
    cmd.stdin(Stdio::null());

    let parsed_mask = umask_spec.and_then(parse_umask);
    if umask_spec.is_some() && parsed_mask.is_none() {
        warn!(umask = umask_spec, "could not parse plugin umask, leaving process umask unchanged");
    }

    // Single-threaded cooperative loop (spec §5): briefly override the
    // process umask around the spawn, matching the source's `Popen(umask=...)`.
    let previous_mask = parsed_mask.map(umask);

    let spawn_result = cmd.spawn();

    if let Some(prev) = previous_mask {
        umask(prev);
    }

    let mut child = match spawn_result {
        Ok(c) => c,
        Err(e) => return ExecOutcome { exit_code: None, spawn_error: Some(e.to_string()) },
    };

    if let Some(pid) = child.id() {
        registry.track(pid);
    }
    let pid_for_untrack = child.id();

    let status = child.wait().await;

    if let Some(pid) = pid_for_untrack {
        registry.untrack(pid);
    }

    match status {
        Ok(status) => ExecOutcome { exit_code: status.code(), spawn_error: None },
        Err(e) => ExecOutcome { exit_code: None, spawn_error: Some(e.to_string()) },
    }
}
