//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`], which builds a full [`AppContext`] whose ffmpeg is
//! a small shell script (see [`fake_ffmpeg`]), and helpers for laying out
//! fragment groups on disk. The [`TestHarness::with_server`] constructor
//! starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use fg_av::ToolRegistry;
use fg_core::config::Config;
use fg_server::context::AppContext;
use fg_server::router::build_router;

/// Stand-in for ffmpeg. It logs every invocation next to itself, refuses
/// inputs that still carry the nine-zero marker, fails when the video input
/// contains `FAIL` (after writing a truncated output if it contains
/// `PARTIAL`), sleeps when it contains `SLOW`, and otherwise writes the
/// concatenated inputs to the output path.
const FAKE_FFMPEG: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/calls.log"
if [ "$1" = "-version" ]; then
  echo "ffmpeg version fake"
  exit 0
fi
video="$3"
audio="$5"
out="${12}"
for f in "$video" "$audio"; do
  if [ "$(head -c 9 "$f")" = "000000000" ]; then
    echo "Invalid data found when processing input: $f" >&2
    exit 2
  fi
done
if grep -q SLOW "$video"; then
  sleep 2
fi
if grep -q PARTIAL "$video"; then
  printf PARTIAL > "$out"
  echo "simulated mux failure after partial write" >&2
  exit 1
fi
if grep -q FAIL "$video"; then
  echo "simulated mux failure" >&2
  exit 1
fi
cat "$video" "$audio" > "$out"
"#;

/// Write the fake ffmpeg script into `dir` and return its path.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("ffmpeg");
    std::fs::write(&path, FAKE_FFMPEG).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Create a group directory with an `entry.json` descriptor and fragments.
pub fn write_group(dir: &Path, descriptor: &str, fragments: &[(&str, &[u8])]) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("entry.json"), descriptor).unwrap();
    for (name, content) in fragments {
        std::fs::write(dir.join(name), content).unwrap();
    }
}

/// Fragment content as a player cache stores it: marker, then payload.
pub fn cached(payload: &[u8]) -> Vec<u8> {
    let mut content = fg_av::HEADER_MARKER.to_vec();
    content.extend_from_slice(payload);
    content
}

/// Test harness wrapping a fully-constructed [`AppContext`].
pub struct TestHarness {
    pub ctx: AppContext,
    /// Holds the fake ffmpeg and its call log.
    pub tools_dir: TempDir,
}

impl TestHarness {
    /// Create a harness with default configuration and the fake ffmpeg.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a harness with a custom configuration. On unix the ffmpeg path
    /// is pointed at the fake script.
    pub fn with_config(mut config: Config) -> Self {
        let tools_dir = tempfile::tempdir().unwrap();
        #[cfg(unix)]
        {
            config.tools.ffmpeg_path = Some(fake_ffmpeg(tools_dir.path()));
        }
        let tools = Arc::new(ToolRegistry::discover(&config.tools));
        let ctx = AppContext::new(config, tools);
        Self { ctx, tools_dir }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let app = build_router(harness.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    /// Number of times the fake ffmpeg was asked to mux.
    pub fn mux_calls(&self) -> usize {
        std::fs::read_to_string(self.tools_dir.path().join("calls.log"))
            .map(|log| log.lines().filter(|l| !l.starts_with("-version")).count())
            .unwrap_or(0)
    }
}

/// Poll `GET /progress` until the job reaches a terminal state.
pub async fn wait_for_terminal(addr: SocketAddr) -> serde_json::Value {
    let url = format!("http://{addr}/progress");
    for _ in 0..200 {
        let json: serde_json::Value = reqwest::get(&url).await.unwrap().json().await.unwrap();
        if json["status"] == "completed" || json["status"] == "error" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("job did not finish in time");
}
