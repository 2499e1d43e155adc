// SPDX-License-Identifier: MIT

//! Link-state scanning (spec §4.8 "link scanner"). Reading real operational
//! state from the OS/AppDB is an external collaborator (spec §1: "CLI
//! status/erase/enable commands, argument parsing, logging backends, EEPROM
//! /hostname identifier helpers" out of scope — the same applies to the
//! platform's netlink/AppDB layer); this trait is the seam a platform
//! integration plugs a real scanner into.

/// Detects management/front-panel interfaces transitioning from down to up.
pub trait LinkScanner: Send + Sync {
    /// Returns `true` iff at least one interface has moved from non-up to up
    /// since the previous call.
    fn scan(&mut self) -> bool;
}

/// No platform integration wired in: never reports a link-up transition.
#[derive(Debug, Default)]
pub struct NullLinkScanner;

impl LinkScanner for NullLinkScanner {
    fn scan(&mut self) -> bool {
        false
    }
}

/// Scripted answers for tests.
#[derive(Debug, Default)]
pub struct FakeLinkScanner {
    pub answers: std::collections::VecDeque<bool>,
}

impl FakeLinkScanner {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self { answers: answers.into_iter().collect() }
    }
}

impl LinkScanner for FakeLinkScanner {
    fn scan(&mut self) -> bool {
        self.answers.pop_front().unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_scanner_never_detects_link_up() {
        let mut scanner = NullLinkScanner;
        assert!(!scanner.scan());
    }

    #[test]
    fn fake_scanner_replays_scripted_answers_then_defaults_to_false() {
        let mut scanner = FakeLinkScanner::new([true, false]);
        assert!(scanner.scan());
        assert!(!scanner.scan());
        assert!(!scanner.scan());
    }
}
