// SPDX-License-Identifier: MIT

//! Atomic, fsync'd file writes (spec §4.4 "write-then-fsync discipline";
//! §3 invariant: "the on-disk file is always well-formed JSON").

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `contents` to `path` by writing a sibling temp file, fsyncing it,
/// then renaming it over the destination. The destination either has its
/// old content or the new content in full — never a partial write.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    if let Ok(dir_handle) = File::open(dir) {
        let _ = dir_handle.sync_all();
    }
    Ok(())
}

/// Write a `serde_json::Value` (or any `Serialize`) as pretty JSON, atomically.
pub fn atomic_write_json<T: serde::Serialize>(path: &Path, value: &T) -> io::Result<()> {
    let bytes = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
    atomic_write(path, &bytes)
}
