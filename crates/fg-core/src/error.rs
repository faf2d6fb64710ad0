//! Unified error type for fragforge.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for API handlers to derive an HTTP status code via [`Error::http_status`].
//! Per-group skips are not errors; see `fg_pipeline::GroupOutcome`.

use std::fmt;
use std::path::PathBuf;

/// Unified error type covering all failure modes in fragforge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested entity could not be found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "output directory").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// Request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A conflicting operation is already in progress.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The host platform does not support the requested operation.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A JSON document (descriptor or config) could not be parsed.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying parse error.
        #[from]
        source: serde_json::Error,
    },

    /// An external tool (ffmpeg) returned an error.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description, including captured output.
        message: String,
    },

    /// The scan root does not exist.
    #[error("Directory does not exist: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The scan found no directory holding a descriptor.
    #[error("No video directories found under {} (each needs a .json descriptor)", .0.display())]
    NoGroupsFound(PathBuf),

    /// A group holds fewer than two fragment files.
    #[error("Incomplete fragments in {}: found {found}", dir.display())]
    InsufficientFragments {
        /// The group directory.
        dir: PathBuf,
        /// Number of fragment files found.
        found: usize,
    },

    /// Stripping or restoring a fragment header failed.
    #[error("Header I/O error on {}: {source}", path.display())]
    HeaderIo {
        /// The fragment file being patched.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Conflict(_) => 409,
            Error::Unsupported(_) => 501,
            Error::Io { .. } => 500,
            Error::Json { .. } => 422,
            Error::Tool { .. } => 502,
            Error::InputNotFound(_) => 404,
            Error::NoGroupsFound(_) => 422,
            Error::InsufficientFragments { .. } => 422,
            Error::HeaderIo { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Short machine-readable code for API bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Validation(_) => "validation_error",
            Error::Conflict(_) => "conflict",
            Error::Unsupported(_) => "unsupported",
            Error::Io { .. } => "io_error",
            Error::Json { .. } => "json_error",
            Error::Tool { .. } => "tool_error",
            Error::InputNotFound(_) => "input_not_found",
            Error::NoGroupsFound(_) => "no_groups_found",
            Error::InsufficientFragments { .. } => "insufficient_fragments",
            Error::HeaderIo { .. } => "header_io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Render the error followed by its `source()` chain, one cause per line.
    pub fn trace(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::HeaderIo`].
    pub fn header_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::HeaderIo {
            path: path.into(),
            source,
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("output directory", "/tmp/x");
        assert_eq!(err.to_string(), "output directory not found: /tmp/x");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn conflict_display() {
        let err = Error::Conflict("a job is already running".into());
        assert_eq!(err.to_string(), "Conflict: a job is already running");
        assert_eq!(err.http_status(), 409);
        assert_eq!(err.code(), "conflict");
    }

    #[test]
    fn unsupported_maps_to_501() {
        let err = Error::Unsupported("haiku".into());
        assert_eq!(err.http_status(), 501);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn tool_display() {
        let err = Error::tool("ffmpeg", "exit code 1");
        assert_eq!(err.to_string(), "Tool error [ffmpeg]: exit code 1");
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn input_not_found_display() {
        let err = Error::InputNotFound(PathBuf::from("/missing"));
        assert_eq!(err.to_string(), "Directory does not exist: /missing");
    }

    #[test]
    fn no_groups_mentions_video_directories() {
        let err = Error::NoGroupsFound(PathBuf::from("/empty"));
        assert!(err.to_string().contains("No video directories"));
    }

    #[test]
    fn trace_includes_source_chain() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err = Error::header_io("/a/video.m4s", io_err);
        let trace = err.trace();
        assert!(trace.starts_with("Header I/O error on /a/video.m4s"));
        assert!(trace.contains("caused by: read-only"));
    }

    #[test]
    fn result_alias() {
        fn ok_fn() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(ok_fn().unwrap(), 42);

        fn err_fn() -> Result<i32> {
            Err(Error::Internal("boom".into()))
        }
        assert!(err_fn().is_err());
    }
}
