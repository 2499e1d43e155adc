// SPDX-License-Identifier: MIT

//! Errors surfaced by the Discovery Loop (component C8).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to write synthesized provisioning document to {path}: {source}")]
    Io { path: std::path::PathBuf, source: std::io::Error },
}
