//! Walk the input tree and collect group directories.

use std::path::{Path, PathBuf};

use fg_core::config::LayoutConfig;

use crate::locate::has_direct_descriptor;

/// Return every directory under `root` (root included) that directly holds a
/// descriptor file, in pre-order with siblings visited in file-name order.
///
/// Directories named like the output folder are pruned together with their
/// subtree so earlier output is never rescanned. The root itself is always
/// visited. An empty result is not an error here; the runner turns it into
/// [`fg_core::Error::NoGroupsFound`].
pub fn scan_groups(root: &Path, layout: &LayoutConfig) -> fg_core::Result<Vec<PathBuf>> {
    let mut groups = Vec::new();

    let walker = walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            // Skip prior output; it holds finished files, not fragments.
            e.depth() == 0
                || !e.file_type().is_dir()
                || e.file_name() != layout.output_folder.as_str()
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(err
                    .into_io_error()
                    .map(fg_core::Error::from)
                    .unwrap_or_else(|| fg_core::Error::Internal("cannot walk scan root".into())));
            }
            Err(err) => {
                tracing::warn!(error = %err, "Error walking directory");
                continue;
            }
        };

        if !entry.file_type().is_dir() {
            continue;
        }

        match has_direct_descriptor(entry.path(), layout) {
            Ok(true) => groups.push(entry.into_path()),
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(dir = %entry.path().display(), "Cannot list directory: {e}");
            }
        }
    }

    tracing::debug!("scan of {} found {} group(s)", root.display(), groups.len());
    Ok(groups)
}
