//! Decide where the aggregate output directory lives relative to the scan
//! root.

use std::path::{Path, PathBuf};

use fg_core::config::LayoutConfig;

/// Resolve the output directory for a scan rooted at `input`.
///
/// First match wins:
///
/// 1. `input` directly holds a descriptor: the root is itself one group, so
///    output goes next to it, `parent(input)/<output_folder>`.
/// 2. A descriptor exists anywhere below `input`: the root is a collection,
///    output nests inside it, `input/<output_folder>`.
/// 3. Otherwise `parent(input)/<output_folder>`.
///
/// Rules 1 and 3 need a parent; a root without one (`/`) falls through to
/// `input/<output_folder>`. Nothing is created on disk.
///
/// `input` should be absolute and must exist.
pub fn resolve_output_dir(input: &Path, layout: &LayoutConfig) -> fg_core::Result<PathBuf> {
    let parent = input.parent().filter(|p| p.exists());

    if let Some(parent) = parent {
        if has_direct_descriptor(input, layout)? {
            return Ok(parent.join(&layout.output_folder));
        }
    }

    if has_nested_descriptor(input, layout) {
        return Ok(input.join(&layout.output_folder));
    }

    Ok(parent.unwrap_or(input).join(&layout.output_folder))
}

/// True if `dir` itself (non-recursive) contains a descriptor file.
pub(crate) fn has_direct_descriptor(dir: &Path, layout: &LayoutConfig) -> fg_core::Result<bool> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() && layout.is_descriptor(&entry.path()) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn has_nested_descriptor(dir: &Path, layout: &LayoutConfig) -> bool {
    walkdir::WalkDir::new(dir)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| e.file_type().is_file() && layout.is_descriptor(e.path()))
}
