// SPDX-License-Identifier: MIT

//! Subprocess PID registry used for the signal-drain loop (spec §5, §9).
//!
//! The supervisor is single-threaded and cooperative; a signal handler must
//! be async-signal-safe, so it can only flip a flag. The actual drain — wait
//! up to `sighandler-wait-interval` seconds per tracked PID, then hard-kill
//! stragglers — runs from the main loop against this registry.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// Thread-safe (but not signal-safe) set of in-flight child PIDs.
#[derive(Clone, Default)]
pub struct PidRegistry {
    pids: Arc<Mutex<HashSet<u32>>>,
}

impl PidRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&self, pid: u32) {
        self.pids.lock().insert(pid);
    }

    pub fn untrack(&self, pid: u32) {
        self.pids.lock().remove(&pid);
    }

    pub fn snapshot(&self) -> Vec<u32> {
        self.pids.lock().iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.lock().is_empty()
    }
}
