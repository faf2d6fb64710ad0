//! Open the last output directory in the host's file manager.

use std::path::Path;
use std::process::Stdio;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct OpenOutputResponse {
    pub success: bool,
    pub message: String,
    pub path: String,
}

/// POST /open_output
pub async fn open_output(State(ctx): State<AppContext>) -> Result<Json<OpenOutputResponse>, AppError> {
    let Some(dir) = ctx.jobs.output_dir() else {
        return Err(AppError::new(fg_core::Error::Validation(
            "output directory is not set".into(),
        ))
        .with_detail("Run a job first"));
    };

    if !dir.is_dir() {
        return Err(AppError::new(fg_core::Error::not_found(
            "output directory",
            dir.display(),
        )));
    }

    let Some(program) = launcher() else {
        return Err(AppError::new(fg_core::Error::Unsupported(format!(
            "no file manager known for {}",
            std::env::consts::OS
        ))));
    };

    spawn_launcher(program, &dir).map_err(|e| {
        AppError::new(fg_core::Error::Internal(format!(
            "failed to launch {program}: {e}"
        )))
    })?;

    tracing::info!("Opened {} with {program}", dir.display());

    Ok(Json(OpenOutputResponse {
        success: true,
        message: "Output directory opened".into(),
        path: dir.display().to_string(),
    }))
}

/// File manager command for the host OS.
fn launcher() -> Option<&'static str> {
    if cfg!(target_os = "windows") {
        Some("explorer")
    } else if cfg!(target_os = "macos") {
        Some("open")
    } else if cfg!(target_os = "linux") {
        Some("xdg-open")
    } else {
        None
    }
}

/// Start `program <dir>` detached; the child is reaped in the background.
fn spawn_launcher(program: &str, dir: &Path) -> std::io::Result<()> {
    let mut child = tokio::process::Command::new(program)
        .arg(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    tokio::spawn(async move {
        let _ = child.wait().await;
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launcher_known_on_supported_hosts() {
        if cfg!(any(target_os = "windows", target_os = "macos", target_os = "linux")) {
            assert!(launcher().is_some());
        }
    }

    #[tokio::test]
    async fn missing_program_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(spawn_launcher("no-such-file-manager-xyz", tmp.path()).is_err());
    }
}
