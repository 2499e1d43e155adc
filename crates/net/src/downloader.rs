// SPDX-License-Identifier: MIT

//! The Downloader (component C1, spec §4.1).

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};
use ztp_config::ConfigStore;
use ztp_core::Paths;

use crate::identity::SystemIdentity;

/// A synthetic, curl-compatible exit code. `0` is success; `20` is the
/// catch-all failure the source implementation uses for anything it can't
/// attribute to a specific curl return code.
pub const CODE_SUCCESS: i32 = 0;
pub const CODE_UNKNOWN_ERROR: i32 = 20;

/// Per-call overrides of the Downloader's Config-Store-backed defaults
/// (spec §4.1 and the URL/DynamicURL option set in §3).
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    pub include_http_headers: Option<bool>,
    pub secure: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub retries: Option<u32>,
    /// Free-form extra curl flags in the source format; reqwest has no
    /// generic flag-passthrough, so this is recorded but not applied. See
    /// DESIGN.md for the rationale.
    pub curl_arguments: Option<String>,
}

/// Outcome of a download attempt: `(code, path)`. `code == 0` with `path ==
/// Some` is success; any other code means failure and `path` is `None`.
pub type DownloadOutcome = (i32, Option<PathBuf>);

fn is_transient(err: &reqwest::Error) -> bool {
    err.is_connect() || err.is_timeout()
}

/// Rewrite a schemeless source into a `tftp://<hint>/<body>` URL when a TFTP
/// server hint is available (spec §4.1, scenario 5 in §8).
pub fn rewrite_tftp_scheme(source: &str, tftp_hint: Option<&str>) -> String {
    if source.contains("://") {
        return source.to_string();
    }
    match tftp_hint {
        Some(hint) => format!("tftp://{hint}/{}", source.trim_start_matches('/')),
        None => source.to_string(),
    }
}

fn derive_destination(source: &str, destination: Option<&str>, tmp_dir: &Path) -> PathBuf {
    let name = match destination {
        Some(d) => d.to_string(),
        None => source
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or("download")
            .to_string(),
    };
    if name.contains('/') {
        PathBuf::from(name)
    } else {
        tmp_dir.join(name)
    }
}

fn http_headers(identity: &dyn SystemIdentity, include: bool, sonic_version: Option<&str>) -> Vec<(&'static str, String)> {
    if !include {
        return Vec::new();
    }
    let mut headers = Vec::new();
    if let Some(v) = identity.product_name() {
        headers.push(("PRODUCT-NAME", v));
    }
    if let Some(v) = identity.serial_number() {
        headers.push(("SERIAL-NUMBER", v));
    }
    if let Some(v) = identity.mac_addr() {
        headers.push(("BASE-MAC-ADDRESS", v));
    }
    if let Some(v) = sonic_version.map(str::to_string).or_else(|| identity.sonic_version()) {
        headers.push(("SONiC-VERSION", v));
    }
    headers
}

async fn remove_if_present(path: &Path) {
    if tokio::fs::metadata(path).await.is_ok() {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), error = %e, "failed to remove partial download");
        }
    }
}

/// `reqwest` has no `file://` scheme support, so local sources are handled
/// by copying the path directly rather than going through the HTTP client.
async fn get_file(source: &str, dst: &Path) -> DownloadOutcome {
    let src_path = Path::new(source.trim_start_matches("file://"));

    if let Some(parent) = dst.parent() {
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            error!(path = %parent.display(), error = %e, "failed to create destination directory");
            return (CODE_UNKNOWN_ERROR, None);
        }
    }
    if let Err(e) = tokio::fs::copy(src_path, &dst).await {
        error!(source, path = %dst.display(), error = %e, "failed copying file:// source");
        remove_if_present(&dst).await;
        return (CODE_UNKNOWN_ERROR, None);
    }
    if let Err(e) = std::fs::set_permissions(&dst, std::fs::Permissions::from_mode(0o700)) {
        warn!(path = %dst.display(), error = %e, "failed to set owner-rwx permissions on download");
    }
    (CODE_SUCCESS, Some(dst.to_path_buf()))
}

/// `Get(URL-spec, destination?) -> (status-code, path?)` (spec §4.1).
pub async fn get(
    client: &reqwest::Client,
    paths: &Paths,
    cfg: &ConfigStore,
    identity: &dyn SystemIdentity,
    source: &str,
    destination: Option<&str>,
    opts: DownloadOptions,
) -> DownloadOutcome {
    let dst = derive_destination(source, destination, &paths.ztp_tmp);

    if source.starts_with("file://") {
        return get_file(source, &dst).await;
    }

    let include_headers = opts.include_http_headers.unwrap_or_else(|| {
        cfg.get_bool("include-http-headers").unwrap_or(true)
    });
    let secure = opts.secure.unwrap_or_else(|| cfg.get_bool("https-secure").unwrap_or(true));
    let timeout_secs = opts.timeout_secs.unwrap_or_else(|| {
        cfg.get_i64("curl-timeout").unwrap_or(30).max(0) as u64
    });
    let retries = opts.retries.unwrap_or_else(|| cfg.get_i64("curl-retries").unwrap_or(3).max(0) as u32);
    let user_agent = cfg.get_string("http-user-agent").unwrap_or_else(|| "SONiC-ZTP/0.1".to_string());

    if opts.curl_arguments.is_some() {
        debug!(source, "curl-arguments option present but not applied by the HTTP client backend");
    }

    let headers = http_headers(identity, include_headers, None);
    let mut attempts_left = retries;

    loop {
        let started = Instant::now();
        let mut builder = client
            .get(source)
            .header(reqwest::header::USER_AGENT, user_agent.clone())
            .timeout(Duration::from_secs(timeout_secs.max(1)));
        if !secure {
            // Per-request insecure toggling needs a dedicated client; callers
            // that need it build one via `insecure_client()`.
            debug!(source, "secure=false requested; caller must supply an insecure-capable client");
        }
        for (name, value) in &headers {
            builder = builder.header(*name, value.clone());
        }

        let result = builder.send().await;
        let elapsed = started.elapsed();

        let response = match result {
            Ok(r) => r,
            Err(e) => {
                if is_transient(&e) && attempts_left > 0 && elapsed < Duration::from_secs(timeout_secs) {
                    warn!(source, error = %e, "transient transport error, retrying");
                    let remaining = Duration::from_secs(timeout_secs).saturating_sub(elapsed);
                    tokio::time::sleep(remaining).await;
                    attempts_left -= 1;
                    continue;
                }
                error!(source, error = %e, "download failed");
                remove_if_present(&dst).await;
                return (CODE_UNKNOWN_ERROR, None);
            }
        };

        if !response.status().is_success() {
            error!(source, status = %response.status(), "server returned an error status");
            remove_if_present(&dst).await;
            return (CODE_UNKNOWN_ERROR, None);
        }

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                error!(source, error = %e, "failed reading response body");
                remove_if_present(&dst).await;
                return (CODE_UNKNOWN_ERROR, None);
            }
        };

        if let Some(parent) = dst.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                error!(path = %parent.display(), error = %e, "failed to create destination directory");
                return (CODE_UNKNOWN_ERROR, None);
            }
        }
        if let Err(e) = tokio::fs::write(&dst, &bytes).await {
            error!(path = %dst.display(), error = %e, "failed writing downloaded content");
            return (CODE_UNKNOWN_ERROR, None);
        }
        if let Err(e) = std::fs::set_permissions(&dst, std::fs::Permissions::from_mode(0o700)) {
            warn!(path = %dst.display(), error = %e, "failed to set owner-rwx permissions on download");
        }

        return (CODE_SUCCESS, Some(dst));
    }
}
