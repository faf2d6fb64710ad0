//! The batch job: locate output, scan, then process groups one at a time.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fg_av::{ClassifyMethod, PatchedFragments, ToolRegistry};
use fg_core::config::{Config, LayoutConfig};

use crate::context::ProgressSender;
use crate::locate::resolve_output_dir;
use crate::resolve::{resolve_group, Resolution};
use crate::scan::scan_groups;

/// First message of every job.
pub const SCANNING_MESSAGE: &str = "Scanning directory...";

/// What happened to one group. Only [`GroupOutcome::Merged`] counts towards
/// the success tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    Merged,
    AlreadyExists,
    NoDescriptor,
    Incomplete { found: usize },
    Failed { reason: String },
}

impl GroupOutcome {
    /// Skipped or failed for a reason other than existing output.
    fn is_invalid(&self) -> bool {
        !matches!(self, GroupOutcome::Merged | GroupOutcome::AlreadyExists)
    }
}

/// Result of a job that got past the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub output_dir: PathBuf,
    pub outcomes: Vec<GroupOutcome>,
}

impl JobSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn merged(&self) -> usize {
        self.count(|o| matches!(o, GroupOutcome::Merged))
    }

    pub fn already_exists(&self) -> usize {
        self.count(|o| matches!(o, GroupOutcome::AlreadyExists))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, GroupOutcome::Failed { .. }))
    }

    /// `"<merged>/<total>"`.
    pub fn tally(&self) -> String {
        format!("{}/{}", self.merged(), self.total())
    }

    fn count(&self, pred: impl Fn(&GroupOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(o)).count()
    }
}

/// Runs jobs against a fixed tool registry and layout.
///
/// Groups are processed strictly in sequence; a failing group never stops
/// the loop. Only a missing input directory, a scan failure or an empty scan
/// end the job in `error`.
#[derive(Debug, Clone)]
pub struct JobRunner {
    tools: Arc<ToolRegistry>,
    layout: LayoutConfig,
    mux_timeout: Option<Duration>,
}

impl JobRunner {
    pub fn new(tools: Arc<ToolRegistry>, config: &Config) -> Self {
        Self {
            tools,
            layout: config.layout.clone(),
            mux_timeout: config.tools.mux_timeout(),
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Run one job over `input`, reporting through `progress`, and leave the
    /// snapshot in a terminal state.
    pub async fn run(&self, input: &Path, progress: &ProgressSender) -> fg_core::Result<JobSummary> {
        let result = self.execute(input, progress).await;
        match &result {
            Ok(summary) => progress.complete(format!(
                "Done! Merged {} videos",
                summary.tally()
            )),
            Err(e) => progress.fail(e.trace()),
        }
        result
    }

    async fn execute(&self, input: &Path, progress: &ProgressSender) -> fg_core::Result<JobSummary> {
        let root = absolute_dir(input)?;

        let layout = self.layout.clone();
        let scan_root = root.clone();
        let output_dir = blocking(move || resolve_output_dir(&scan_root, &layout)).await?;
        progress.set_output_dir(output_dir.clone());
        progress.message(format!("Output directory: {}", output_dir.display()));

        let layout = self.layout.clone();
        let scan_root = root.clone();
        let groups = blocking(move || scan_groups(&scan_root, &layout)).await?;
        progress.message(format!("Found {} video directories", groups.len()));

        if groups.is_empty() {
            return Err(fg_core::Error::NoGroupsFound(root));
        }

        tokio::fs::create_dir_all(&output_dir).await?;

        let total = groups.len();
        let mut outcomes = Vec::with_capacity(total);
        for (i, dir) in groups.iter().enumerate() {
            let idx = i + 1;
            let outcome = self.process_group(idx, total, dir, &output_dir, progress).await;
            tracing::debug!(group = %dir.display(), ?outcome, "group finished");
            if outcome.is_invalid() {
                progress.message(format!("{idx}/{total}: skipped invalid directory: {}", dir.display()));
            }
            outcomes.push(outcome);
        }

        Ok(JobSummary {
            output_dir,
            outcomes,
        })
    }

    async fn process_group(
        &self,
        idx: usize,
        total: usize,
        dir: &Path,
        output_dir: &Path,
        progress: &ProgressSender,
    ) -> GroupOutcome {
        let layout = self.layout.clone();
        let group_dir = dir.to_path_buf();
        let output_root = output_dir.to_path_buf();
        let resolution = blocking(move || resolve_group(&group_dir, &output_root, &layout)).await;

        let target = match resolution {
            Ok(Resolution::Proceed(target)) => target,
            Ok(Resolution::AlreadyExists(target)) => {
                progress.message(format!("{idx}/{total}: already exists, skipped - {}", target.name));
                return GroupOutcome::AlreadyExists;
            }
            Ok(Resolution::NoDescriptor) => {
                progress.message(format!("{idx}/{total}: skipped - no .{} descriptor", self.layout.descriptor_extension));
                return GroupOutcome::NoDescriptor;
            }
            Err(e) => return self.failed(idx, total, e, progress),
        };

        progress.message(format!("{idx}/{total}: processing - {}", target.name));

        let layout = self.layout.clone();
        let group_dir = dir.to_path_buf();
        let fragments = match blocking(move || {
            fg_av::list_fragments(&group_dir, |p| layout.is_fragment(p))
        })
        .await
        {
            Ok(files) => files,
            Err(e) => return self.failed(idx, total, e, progress),
        };

        let pair = match fg_av::classify(dir, &fragments) {
            Ok(pair) => pair,
            Err(fg_core::Error::InsufficientFragments { found, .. }) => {
                progress.message(format!(
                    "{idx}/{total}: skipped - incomplete fragments (found {found} .{} files)",
                    self.layout.fragment_extension
                ));
                return GroupOutcome::Incomplete { found };
            }
            Err(e) => return self.failed(idx, total, e, progress),
        };

        if pair.method == ClassifyMethod::Size {
            progress.message(format!("{idx}/{total}: inferred video/audio by file size"));
        }

        if let Some(parent) = target.destination.parent() {
            if let Err(e) = tokio::fs::create_dir_all(parent).await {
                return self.failed(idx, total, e.into(), progress);
            }
        }

        let paths = [pair.video.clone(), pair.audio.clone()];
        let (patched, strip_errors) = match blocking(move || Ok(PatchedFragments::strip_all(paths))).await {
            Ok(stripped) => stripped,
            Err(e) => return self.failed(idx, total, e, progress),
        };
        for e in strip_errors {
            progress.message(format!("{idx}/{total}: header error - {e}"));
        }

        let muxed = fg_av::mux(
            &self.tools,
            &pair.video,
            &pair.audio,
            &target.destination,
            self.mux_timeout,
        )
        .await;

        match blocking(move || Ok(patched.restore())).await {
            Ok(errors) => {
                for e in errors {
                    progress.message(format!("{idx}/{total}: header restore error - {e}"));
                }
            }
            Err(e) => progress.message(format!("{idx}/{total}: header restore error - {e}")),
        }

        match muxed {
            Ok(_) => {
                progress.message(format!("{idx}/{total}: merged - {}", target.name));
                GroupOutcome::Merged
            }
            Err(e) => {
                let reason = e.to_string();
                progress.message(format!("{idx}/{total}: merge failed - {}\n{reason}", target.name));
                // A partial file would be taken for finished output next run.
                match tokio::fs::remove_file(&target.destination).await {
                    Ok(()) => tracing::info!("removed partial output {}", target.destination.display()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => progress.message(format!(
                        "{idx}/{total}: could not remove partial output {} - {e}",
                        target.destination.display()
                    )),
                }
                GroupOutcome::Failed { reason }
            }
        }
    }

    fn failed(&self, idx: usize, total: usize, err: fg_core::Error, progress: &ProgressSender) -> GroupOutcome {
        let reason = err.trace();
        progress.message(format!("{idx}/{total}: error - {reason}"));
        GroupOutcome::Failed { reason }
    }
}

/// Check that `input` is an existing directory and make it absolute against
/// the working directory. `.` and `..` are collapsed lexically; symlinks are
/// kept so the output lands next to the path the user gave.
fn absolute_dir(input: &Path) -> fg_core::Result<PathBuf> {
    if !input.is_dir() {
        return Err(fg_core::Error::InputNotFound(input.to_path_buf()));
    }
    Ok(normalize_lexically(&std::path::absolute(input)?))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Run blocking filesystem work off the async worker threads.
async fn blocking<T, F>(f: F) -> fg_core::Result<T>
where
    F: FnOnce() -> fg_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| fg_core::Error::Internal(format!("blocking task failed: {e}")))?
}
