//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server, tool and output-layout sections. Every section defaults sensibly so
//! a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub tools: ToolsConfig,
    pub layout: LayoutConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Load configuration strictly: read and parse errors are returned.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        let folder = &self.layout.output_folder;
        if folder.is_empty() {
            warnings.push("layout.output_folder is empty".into());
        } else if folder.contains('/') || folder.contains('\\') {
            warnings.push(format!(
                "layout.output_folder '{folder}' contains a path separator"
            ));
        }

        for (key, ext) in [
            ("descriptor_extension", &self.layout.descriptor_extension),
            ("fragment_extension", &self.layout.fragment_extension),
        ] {
            if ext.starts_with('.') {
                warnings.push(format!("layout.{key} '{ext}' should not start with a dot"));
            }
        }

        if let Some(ref path) = self.tools.ffmpeg_path {
            if !path.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; falling back to discovery",
                    path.display()
                ));
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the web UI; served as a fallback for unknown routes.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            static_dir: None,
        }
    }
}

/// External tool settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    pub ffmpeg_path: Option<PathBuf>,
    /// Upper bound for one mux invocation. `None` waits indefinitely.
    pub mux_timeout_secs: Option<u64>,
}

impl ToolsConfig {
    pub fn mux_timeout(&self) -> Option<Duration> {
        self.mux_timeout_secs.map(Duration::from_secs)
    }
}

/// Names and extensions that define the on-disk layout of inputs and outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Name of the aggregate output directory.
    pub output_folder: String,
    /// Extension (without dot) of the per-group JSON descriptor.
    pub descriptor_extension: String,
    /// Extension (without dot) of fragment files.
    pub fragment_extension: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            output_folder: "processed_videos".into(),
            descriptor_extension: "json".into(),
            fragment_extension: "m4s".into(),
        }
    }
}

impl LayoutConfig {
    /// True if `path` has the descriptor extension (case-insensitive).
    pub fn is_descriptor(&self, path: &Path) -> bool {
        has_extension(path, &self.descriptor_extension)
    }

    /// True if `path` has the fragment extension (case-insensitive).
    pub fn is_fragment(&self, path: &Path) -> bool {
        has_extension(path, &self.fragment_extension)
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}
