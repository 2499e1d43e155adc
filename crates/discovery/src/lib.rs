// SPDX-License-Identifier: MIT

//! The Discovery Loop (component C8, spec §4.8).
//!
//! This crate owns the directly-testable, single-iteration pieces of
//! discovery: ranked source probing, link-state scanning, and network
//! profile install/remove. The outer sleep/retry loop that ties these
//! together with the Section Execution Engine is a supervisor concern and
//! lives in the `ztp-cli` binary.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod link;
pub mod profile;
pub mod sources;

pub use error::DiscoveryError;
pub use link::{FakeLinkScanner, LinkScanner, NullLinkScanner};
pub use profile::{FakeProfileInstaller, ProfileInstaller, ShellProfileInstaller};
pub use sources::{probe, SourceHit};
