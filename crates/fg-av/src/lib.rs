//! # fg-av
//!
//! Fragment handling and external tool management for the fragforge
//! pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache the path to
//!   ffmpeg, honoring a configured override and a binary bundled next to the
//!   executable.
//! - **Command execution** ([`ToolCommand`]) -- async builder with optional
//!   timeout for running external processes.
//! - **Fragment classification** ([`classify`]) -- decide which fragment of a
//!   group is video and which is audio.
//! - **Header patching** ([`header`]) -- strip and restore the marker prefix
//!   that stops ffmpeg from reading cached fragments.
//! - **Action functions** ([`actions`]) -- the mux step.

pub mod actions;
pub mod classify;
pub mod command;
pub mod header;
pub mod tools;

// ---- Re-exports for convenience ----

pub use classify::{classify, list_fragments, ClassifyMethod, FragmentFile, FragmentPair};
pub use command::{ToolCommand, ToolOutput};
pub use header::{HeaderSnapshot, PatchedFragments, HEADER_MARKER};
pub use tools::{ToolInfo, ToolRegistry};

// Action functions
pub use actions::mux;
