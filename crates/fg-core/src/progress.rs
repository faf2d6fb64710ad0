//! Progress snapshot exposed to pollers.
//!
//! A snapshot is an immutable value: the job writes a new one on every step
//! and pollers clone the latest. Only the latest message is retained.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Identifier of one batch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a job: `ready -> processing -> {completed, error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Ready,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

/// Point-in-time view of a job's progress.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub job_id: Option<JobId>,
    pub status: JobStatus,
    /// Latest human-readable progress line.
    pub message: String,
    /// Aggregate output directory; `None` until it has been resolved.
    pub output_dir: Option<PathBuf>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ProgressSnapshot {
    /// Initial snapshot for a job that has just been accepted.
    pub fn started(job_id: JobId, message: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id),
            status: JobStatus::Processing,
            message: message.into(),
            output_dir: None,
            started_at: Some(Utc::now()),
            finished_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ready_without_output() {
        let snap = ProgressSnapshot::default();
        assert_eq!(snap.status, JobStatus::Ready);
        assert!(snap.message.is_empty());
        assert!(snap.output_dir.is_none());
        assert!(snap.job_id.is_none());
    }

    #[test]
    fn started_clears_output_dir() {
        let snap = ProgressSnapshot::started(JobId::new(), "Scanning directory...");
        assert_eq!(snap.status, JobStatus::Processing);
        assert!(snap.output_dir.is_none());
        assert!(snap.started_at.is_some());
        assert!(snap.finished_at.is_none());
    }

    #[test]
    fn serializes_wire_shape() {
        let snap = ProgressSnapshot {
            status: JobStatus::Completed,
            message: "done".into(),
            output_dir: Some(PathBuf::from("/data/processed_videos")),
            ..Default::default()
        };
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["message"], "done");
        assert_eq!(json["output_dir"], "/data/processed_videos");
        assert!(json["job_id"].is_null());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::Ready.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }
}
