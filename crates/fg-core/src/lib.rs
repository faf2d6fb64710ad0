//! fg-core: shared types, errors, configuration, and the progress snapshot.
//!
//! This crate is the foundational dependency for all other fg-* crates,
//! providing the unified error type, the JSON configuration, the parsed
//! per-group descriptor, and the snapshot type exposed to pollers.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod progress;

// Re-export the most commonly used items at the crate root.
pub use descriptor::Descriptor;
pub use error::{Error, Result};
pub use progress::{JobId, JobStatus, ProgressSnapshot};
