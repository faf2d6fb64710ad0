//! Strip and restore the marker prefix carried by cached fragment files.
//!
//! Some players prepend nine ASCII zeros to every cached fragment, which makes
//! the file unreadable to ffmpeg. The prefix is removed before muxing and put
//! back afterwards so the cache stays intact.
//!
//! All functions here perform blocking file I/O; async callers should run them
//! through `tokio::task::spawn_blocking`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// The literal prefix removed by [`strip`].
pub const HEADER_MARKER: &[u8; 9] = b"000000000";

/// Bytes removed from the front of a fragment. Empty when the file did not
/// start with [`HEADER_MARKER`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSnapshot {
    bytes: Vec<u8>,
}

impl HeaderSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Remove the marker prefix from `path` if present.
///
/// Returns the removed bytes, or an empty snapshot (and leaves the file
/// untouched) when the file does not start with the marker.
pub fn strip(path: &Path) -> fg_core::Result<HeaderSnapshot> {
    let content = fs::read(path).map_err(|e| fg_core::Error::header_io(path, e))?;

    if !content.starts_with(HEADER_MARKER) {
        return Ok(HeaderSnapshot::default());
    }

    let (head, body) = content.split_at(HEADER_MARKER.len());
    rewrite(path, &[], body).map_err(|e| fg_core::Error::header_io(path, e))?;
    tracing::debug!("stripped header from {}", path.display());

    Ok(HeaderSnapshot {
        bytes: head.to_vec(),
    })
}

/// Prepend `snapshot` to the current contents of `path`. No-op for an empty
/// snapshot.
pub fn restore(path: &Path, snapshot: &HeaderSnapshot) -> fg_core::Result<()> {
    if snapshot.is_empty() {
        return Ok(());
    }

    let content = fs::read(path).map_err(|e| fg_core::Error::header_io(path, e))?;
    rewrite(path, snapshot.as_bytes(), &content).map_err(|e| fg_core::Error::header_io(path, e))?;
    tracing::debug!("restored header on {}", path.display());

    Ok(())
}

/// Replace `path` with `prefix + body` via a sibling temp file so a crash
/// mid-write never leaves a truncated fragment behind.
fn rewrite(path: &Path, prefix: &[u8], body: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(path)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(prefix)?;
    tmp.write_all(body)?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

/// Fragments of one group with their headers stripped.
///
/// Call [`PatchedFragments::restore`] once the mux step is over to put the
/// headers back and collect any failures. If the value is dropped without
/// that call (panic, task cancellation) the headers are restored on drop and
/// failures are only logged.
#[derive(Debug, Default)]
pub struct PatchedFragments {
    entries: Vec<(PathBuf, HeaderSnapshot)>,
}

impl PatchedFragments {
    /// Strip every path in order. A file that cannot be stripped is recorded
    /// with an empty snapshot and its error returned alongside the guard.
    pub fn strip_all<I, P>(paths: I) -> (Self, Vec<fg_core::Error>)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut entries = Vec::new();
        let mut errors = Vec::new();

        for path in paths {
            let path = path.into();
            let snapshot = strip(&path).unwrap_or_else(|e| {
                tracing::warn!("{e}");
                errors.push(e);
                HeaderSnapshot::default()
            });
            entries.push((path, snapshot));
        }

        (Self { entries }, errors)
    }

    /// Number of files whose marker was actually removed.
    pub fn stripped(&self) -> usize {
        self.entries.iter().filter(|(_, s)| !s.is_empty()).count()
    }

    /// Restore every stripped header, returning the failures.
    pub fn restore(mut self) -> Vec<fg_core::Error> {
        self.restore_pending()
    }

    fn restore_pending(&mut self) -> Vec<fg_core::Error> {
        std::mem::take(&mut self.entries)
            .into_iter()
            .filter_map(|(path, snapshot)| restore(&path, &snapshot).err())
            .collect()
    }
}

impl Drop for PatchedFragments {
    fn drop(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        tracing::warn!("restoring {} fragment header(s) on drop", self.entries.len());
        for err in self.restore_pending() {
            tracing::error!("{}", err.trace());
        }
    }
}
