//! # fg-pipeline
//!
//! The batch job that turns a tree of cached fragment groups into MP4 files.
//!
//! This crate provides:
//!
//! - **[`resolve_output_dir`]** -- where the aggregate output directory goes,
//!   based on where descriptors sit relative to the scan root.
//! - **[`scan_groups`]** -- ordered list of directories holding a descriptor.
//! - **[`resolve_group`]** -- destination path and proceed/skip decision for
//!   one group.
//! - **[`JobRunner`]** -- runs the whole job, one group at a time, reporting
//!   through a [`ProgressSender`].

pub mod context;
pub mod locate;
pub mod resolve;
pub mod runner;
pub mod scan;

// Re-export key types at the crate root.
pub use context::{ProgressSender, ABORTED_MESSAGE};
pub use locate::resolve_output_dir;
pub use resolve::{resolve_group, Resolution, Target};
pub use runner::{GroupOutcome, JobRunner, JobSummary, SCANNING_MESSAGE};
pub use scan::scan_groups;
