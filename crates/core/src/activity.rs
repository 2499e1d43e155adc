// SPDX-License-Identifier: MIT

//! Activity file writer (spec §6, §10.3, §11.2).
//!
//! Writes a single human-readable line reporting current engine state,
//! consumed by the out-of-scope CLI `status` command. Best-effort: a
//! failure to write is logged but never fails the caller's operation.

use crate::clock::Clock;
use std::path::Path;

/// Append-free activity sink: always overwrites with the latest message,
/// matching the source implementation's "current state" semantics rather
/// than an append-only log.
pub fn update_activity(path: &Path, clock: &impl Clock, message: &str) {
    let line = format!("{} | {}\n", clock.now_iso(), message);
    if let Err(err) = std::fs::write(path, line) {
        tracing::warn!(path = %path.display(), error = %err, "failed to write activity file");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;

    #[test]
    fn writes_timestamped_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("activity");
        let clock = FakeClock::default();
        update_activity(&path, &clock, "ZTP is administratively disabled");
        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.contains("ZTP is administratively disabled"));
        assert!(content.contains(" | "));
    }

    #[test]
    fn overwrites_previous_message() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("activity");
        let clock = FakeClock::default();
        update_activity(&path, &clock, "first");
        update_activity(&path, &clock, "second");
        let content = std::fs::read_to_string(&path).expect("read");
        assert!(!content.contains("first"));
        assert!(content.contains("second"));
    }
}
