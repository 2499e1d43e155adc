// SPDX-License-Identifier: MIT

//! Black-box checks of the `ztp` binary's command-line surface (spec §6,
//! §8 scenario 6's administrative-disable exit path is exercised directly
//! inside `ztp-cli`'s own test suite, since it needs a rooted `Paths` the
//! compiled binary's fixed filesystem layout can't give an unprivileged
//! test process). The substantive end-to-end scenarios from spec §8
//! (all-success, halt-on-failure, suspend convergence, dynamic-url
//! redirect, opt66/opt67 TFTP rewrite) are covered as library-level tests
//! inside `ztp-engine`, `ztp-document`, and `ztp-net` themselves, where a
//! `Paths::rooted_at` tempdir is available.

use assert_cmd::Command;

fn ztp() -> Command {
    Command::cargo_bin("ztp").expect("ztp binary should build")
}

#[test]
fn version_flag_prints_without_touching_the_filesystem() {
    ztp().arg("--version").assert().success();
}

#[test]
fn help_flag_lists_every_subcommand() {
    let assert = ztp().arg("--help").assert().success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    for sub in ["run", "status", "erase", "enable", "disable"] {
        assert!(output.contains(sub), "expected --help output to mention `{sub}`");
    }
}

#[test]
fn unknown_subcommand_is_rejected_before_any_privileged_action() {
    ztp().arg("bogus-command").assert().failure();
}
