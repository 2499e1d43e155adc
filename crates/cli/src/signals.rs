// SPDX-License-Identifier: MIT

//! SIGTERM/SIGINT handling (spec §4.9, §5). Grounded directly on the
//! source's `signal_handler`: log and update activity, poll tracked
//! subprocess PIDs for up to `sighandler-wait-interval` seconds, SIGKILL any
//! stragglers, then exit immediately — a signal handler in this system never
//! returns control to the caller.

use std::path::PathBuf;
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tracing::{info, warn};
use ztp_core::{Clock, PidRegistry};

fn pid_alive(pid: u32) -> bool {
    signal::kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Poll `registry` once per second, up to `wait_secs`, then SIGKILL any PID
/// still alive. Mirrors `check_pid`/`os.waitpid(..., WNOHANG)` polling in the
/// source's signal handler.
async fn drain_pids(registry: &PidRegistry, wait_secs: u64) {
    for _ in 0..wait_secs {
        if registry.is_empty() {
            return;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    for pid in registry.snapshot() {
        if pid_alive(pid) {
            warn!(pid, "subprocess still alive after sighandler-wait-interval, sending SIGKILL");
            let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
        }
    }
}

/// Install SIGTERM/SIGINT handling. The returned future runs until a signal
/// arrives, drains `registry`, and exits the process directly — callers
/// should `tokio::spawn` it and not await it inline.
pub async fn run<C: Clock>(registry: PidRegistry, clock: C, activity_path: PathBuf, wait_secs: u64) {
    let mut sigterm = match unix_signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(err) => {
            warn!(%err, "failed to install SIGTERM handler");
            return;
        }
    };
    let mut sigint = match unix_signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(err) => {
            warn!(%err, "failed to install SIGINT handler");
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    ztp_core::update_activity(&activity_path, &clock, "Received terminate signal. Shutting down.");
    drain_pids(&registry, wait_secs).await;
    std::process::exit(0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_returns_immediately_when_registry_already_empty() {
        let registry = PidRegistry::new();
        let started = std::time::Instant::now();
        drain_pids(&registry, 5).await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
