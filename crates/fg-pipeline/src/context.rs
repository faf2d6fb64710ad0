//! Progress reporting for a running job.

use std::path::PathBuf;

use chrono::Utc;
use tokio::sync::watch;

use fg_core::{JobId, JobStatus, ProgressSnapshot};

/// Terminal message written when a job stops without finishing.
pub const ABORTED_MESSAGE: &str = "Job aborted";

/// Single writer of a job's [`ProgressSnapshot`].
///
/// Each update replaces the message in place and is mirrored to `tracing` so
/// the full history survives in the log even though pollers only ever see
/// the latest line. Readers hold a [`watch::Receiver`] and clone snapshots
/// out of it without blocking the job.
///
/// Dropping a sender whose job never reached a terminal state (the task was
/// aborted or panicked) records an `error` with [`ABORTED_MESSAGE`].
pub struct ProgressSender {
    job_id: JobId,
    tx: watch::Sender<ProgressSnapshot>,
}

impl ProgressSender {
    /// Start a job in `processing` with `message` and no output directory.
    pub fn new(job_id: JobId, message: impl Into<String>) -> (Self, watch::Receiver<ProgressSnapshot>) {
        let snapshot = ProgressSnapshot::started(job_id, message);
        tracing::info!(job_id = %job_id, "{}", snapshot.message);
        let (tx, rx) = watch::channel(snapshot);
        (Self { job_id, tx }, rx)
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Another reader of this job's progress.
    pub fn subscribe(&self) -> watch::Receiver<ProgressSnapshot> {
        self.tx.subscribe()
    }

    /// Clone of the current snapshot.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.tx.borrow().clone()
    }

    /// Replace the progress message.
    pub fn message(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(job_id = %self.job_id, "{message}");
        self.tx.send_modify(|s| s.message = message);
    }

    /// Record the resolved output directory.
    pub fn set_output_dir(&self, dir: PathBuf) {
        tracing::debug!(job_id = %self.job_id, "output dir {}", dir.display());
        self.tx.send_modify(|s| s.output_dir = Some(dir));
    }

    /// Terminal transition to `completed`.
    pub fn complete(&self, message: impl Into<String>) {
        self.finish(JobStatus::Completed, message.into());
    }

    /// Terminal transition to `error`.
    pub fn fail(&self, message: impl Into<String>) {
        self.finish(JobStatus::Error, message.into());
    }

    fn finish(&self, status: JobStatus, message: String) {
        match status {
            JobStatus::Error => tracing::error!(job_id = %self.job_id, "{message}"),
            _ => tracing::info!(job_id = %self.job_id, "{message}"),
        }
        self.tx.send_modify(|s| {
            s.status = status;
            s.message = message;
            s.finished_at = Some(Utc::now());
        });
    }
}

impl Drop for ProgressSender {
    fn drop(&mut self) {
        let finished = self.tx.borrow().status.is_terminal();
        if !finished {
            self.fail(ABORTED_MESSAGE);
        }
    }
}

impl std::fmt::Debug for ProgressSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSender")
            .field("job_id", &self.job_id)
            .finish_non_exhaustive()
    }
}
