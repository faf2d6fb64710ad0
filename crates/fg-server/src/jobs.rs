//! Single-slot job supervisor.
//!
//! At most one job runs at a time. Starting another while it is active is
//! rejected with [`fg_core::Error::Conflict`]. Finished jobs stay in the slot
//! so their final snapshot (and output directory) remain visible until the
//! next job replaces them.

use std::path::PathBuf;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use fg_core::{JobId, ProgressSnapshot};
use fg_pipeline::{JobRunner, ProgressSender, SCANNING_MESSAGE};

/// The current (or last) job.
#[derive(Debug)]
struct JobHandle {
    id: JobId,
    progress: watch::Receiver<ProgressSnapshot>,
    task: JoinHandle<()>,
}

impl JobHandle {
    fn is_active(&self) -> bool {
        !self.task.is_finished() && !self.progress.borrow().status.is_terminal()
    }
}

#[derive(Debug)]
pub struct JobSupervisor {
    runner: JobRunner,
    slot: Mutex<Option<JobHandle>>,
}

impl JobSupervisor {
    pub fn new(runner: JobRunner) -> Self {
        Self {
            runner,
            slot: Mutex::new(None),
        }
    }

    /// Start a job over `input` on a background task and return its first
    /// snapshot. Must be called inside a tokio runtime.
    pub fn start(&self, input: PathBuf) -> fg_core::Result<ProgressSnapshot> {
        let mut slot = self.slot.lock();

        if let Some(current) = slot.as_ref().filter(|h| h.is_active()) {
            return Err(fg_core::Error::Conflict(format!(
                "job {} is still running",
                current.id
            )));
        }

        let id = JobId::new();
        let (sender, progress) = ProgressSender::new(id, SCANNING_MESSAGE);
        let snapshot = progress.borrow().clone();

        tracing::info!(job_id = %id, input = %input.display(), "Starting job");

        let runner = self.runner.clone();
        let task = tokio::spawn(async move {
            // The outcome is already recorded in the snapshot.
            let _ = runner.run(&input, &sender).await;
        });

        *slot = Some(JobHandle { id, progress, task });
        Ok(snapshot)
    }

    /// Latest snapshot of the current or last job; `ready` before any job.
    pub fn snapshot(&self) -> ProgressSnapshot {
        self.slot
            .lock()
            .as_ref()
            .map(|h| h.progress.borrow().clone())
            .unwrap_or_default()
    }

    /// Output directory recorded by the current or last job.
    pub fn output_dir(&self) -> Option<PathBuf> {
        self.snapshot().output_dir
    }

    pub fn is_active(&self) -> bool {
        self.slot.lock().as_ref().is_some_and(JobHandle::is_active)
    }

    /// Resolve once the current job reaches a terminal state. Returns the
    /// final snapshot, or `None` if no job was ever started.
    pub async fn wait(&self) -> Option<ProgressSnapshot> {
        let mut progress = self.slot.lock().as_ref()?.progress.clone();
        let result = progress
            .wait_for(|s| s.status.is_terminal())
            .await
            .map(|s| s.clone());
        match result {
            Ok(snapshot) => Some(snapshot),
            // Sender already gone; its drop wrote the last snapshot.
            Err(_) => Some(progress.borrow().clone()),
        }
    }

    /// Abort the running job, if any. Fragment headers are put back by the
    /// patch guard when the task is dropped, and the dropped progress sender
    /// leaves the snapshot in `error`.
    pub fn abort(&self) {
        if let Some(handle) = self.slot.lock().as_ref().filter(|h| h.is_active()) {
            tracing::warn!(job_id = %handle.id, "Aborting running job");
            handle.task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use fg_av::ToolRegistry;
    use fg_core::config::Config;
    use fg_core::JobStatus;

    fn supervisor() -> JobSupervisor {
        let runner = JobRunner::new(Arc::new(ToolRegistry::default()), &Config::default());
        JobSupervisor::new(runner)
    }

    #[tokio::test]
    async fn ready_before_any_job() {
        let jobs = supervisor();
        let snap = jobs.snapshot();
        assert_eq!(snap.status, JobStatus::Ready);
        assert!(snap.output_dir.is_none());
        assert!(!jobs.is_active());
        assert!(jobs.wait().await.is_none());
    }

    #[tokio::test]
    async fn start_returns_processing_snapshot() {
        let jobs = supervisor();
        let tmp = tempfile::tempdir().unwrap();

        let snap = jobs.start(tmp.path().join("missing")).unwrap();
        assert_eq!(snap.status, JobStatus::Processing);
        assert_eq!(snap.message, SCANNING_MESSAGE);
        assert!(snap.output_dir.is_none());

        let done = jobs.wait().await.unwrap();
        assert_eq!(done.status, JobStatus::Error);
        assert_eq!(done.job_id, snap.job_id);
    }

    #[tokio::test]
    async fn second_start_while_active_conflicts() {
        let jobs = supervisor();
        let tmp = tempfile::tempdir().unwrap();

        // On a current-thread runtime the spawned job cannot run before we
        // yield, so the slot is guaranteed to still be active here.
        jobs.start(tmp.path().to_path_buf()).unwrap();
        let err = jobs.start(tmp.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, fg_core::Error::Conflict(_)));
        assert_eq!(err.http_status(), 409);

        jobs.wait().await;
    }

    #[tokio::test]
    async fn abort_leaves_error_snapshot() {
        let jobs = supervisor();
        let tmp = tempfile::tempdir().unwrap();

        jobs.start(tmp.path().to_path_buf()).unwrap();
        jobs.abort();

        let done = jobs.wait().await.unwrap();
        assert_eq!(done.status, JobStatus::Error);
        assert_eq!(done.message, fg_pipeline::ABORTED_MESSAGE);
        assert_eq!(jobs.snapshot().status, JobStatus::Error);
        assert!(!jobs.is_active());
    }

    #[tokio::test]
    async fn new_job_allowed_after_finish() {
        let jobs = supervisor();
        let tmp = tempfile::tempdir().unwrap();

        let first = jobs.start(tmp.path().join("missing")).unwrap();
        jobs.wait().await;
        let second = jobs.start(tmp.path().join("missing")).unwrap();
        assert_ne!(first.job_id, second.job_id);
        jobs.wait().await;
    }
}
