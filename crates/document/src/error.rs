// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Loader-level errors (spec §7 "Invalid document").
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("reading document {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("document {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("document is missing the top-level 'ztp' key")]
    MissingZtpRoot,

    #[error("document envelope ('ztp' value) must be a JSON object")]
    EnvelopeNotObject,

    #[error("envelope redirect could not be downloaded (code {code})")]
    RedirectDownloadFailed { code: i32 },

    #[error("redirected document could not be constructed: {0}")]
    RedirectUrlShape(#[from] ztp_net::UrlShapeError),

    #[error("section has an invalid plugin shape")]
    InvalidPluginShape,

    #[error("failed preparing working directories: {0}")]
    Io2(#[source] std::io::Error),
}
