//! Decide which fragment of a group is video and which is audio.
//!
//! [`classify`] is a pure function over already-listed files so the tie-break
//! rules can be tested without touching the filesystem. The caller is expected
//! to pass candidates in file-name order; [`list_fragments`] does that.

use std::path::{Path, PathBuf};

/// A candidate fragment and its size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentFile {
    pub path: PathBuf,
    pub size: u64,
}

impl FragmentFile {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    fn name_contains(&self, keyword: &str) -> bool {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase().contains(keyword))
            .unwrap_or(false)
    }
}

/// Which rule produced a [`FragmentPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyMethod {
    /// File names contained `video` and `audio`.
    Keyword,
    /// Largest file taken as video, second largest as audio.
    Size,
}

/// The video and audio fragment selected for one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentPair {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub method: ClassifyMethod,
}

/// Pick the video and audio fragment out of `files`.
///
/// Keyword rule: the first file whose name contains `video` (any case) is the
/// video, the first whose name contains `audio` is the audio. If either role
/// stays unresolved, or both resolve to the same file, fall back to size:
/// the largest file is video and the second largest is audio, ties kept in
/// input order. The size rule is a guess and may swap streams of similar
/// size.
///
/// # Errors
///
/// [`fg_core::Error::InsufficientFragments`] when fewer than two files are
/// given.
pub fn classify(dir: &Path, files: &[FragmentFile]) -> fg_core::Result<FragmentPair> {
    if files.len() < 2 {
        return Err(fg_core::Error::InsufficientFragments {
            dir: dir.to_path_buf(),
            found: files.len(),
        });
    }

    let video = files.iter().find(|f| f.name_contains("video"));
    let audio = files.iter().find(|f| f.name_contains("audio"));

    if let (Some(video), Some(audio)) = (video, audio) {
        if video.path != audio.path {
            return Ok(FragmentPair {
                video: video.path.clone(),
                audio: audio.path.clone(),
                method: ClassifyMethod::Keyword,
            });
        }
    }

    let mut by_size: Vec<&FragmentFile> = files.iter().collect();
    // sort_by is stable, so equal sizes keep input order
    by_size.sort_by(|a, b| b.size.cmp(&a.size));

    Ok(FragmentPair {
        video: by_size[0].path.clone(),
        audio: by_size[1].path.clone(),
        method: ClassifyMethod::Size,
    })
}

/// List the files in `dir` (non-recursive) accepted by `is_fragment`, sorted
/// by file name, with their sizes.
pub fn list_fragments(
    dir: &Path,
    is_fragment: impl Fn(&Path) -> bool,
) -> fg_core::Result<Vec<FragmentFile>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let metadata = entry.metadata()?;
        if metadata.is_file() && is_fragment(&path) {
            files.push(FragmentFile::new(path, metadata.len()));
        }
    }
    files.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(files)
}
