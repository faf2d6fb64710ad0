//! Job start and progress polling.

use std::path::PathBuf;

use axum::extract::State;
use axum::{Form, Json};
use serde::Deserialize;

use fg_core::ProgressSnapshot;

use crate::context::AppContext;
use crate::error::AppError;

/// Form body of `POST /process`.
#[derive(Debug, Deserialize)]
pub struct ProcessForm {
    #[serde(default)]
    pub directory: String,
}

/// POST /process
///
/// Starts a job over `directory` and returns its first snapshot without
/// waiting for it.
pub async fn process(
    State(ctx): State<AppContext>,
    Form(form): Form<ProcessForm>,
) -> Result<Json<ProgressSnapshot>, AppError> {
    if form.directory.trim().is_empty() {
        return Err(AppError::new(fg_core::Error::Validation(
            "directory is required".into(),
        )));
    }

    let snapshot = ctx
        .jobs
        .start(PathBuf::from(form.directory))
        .map_err(|e| match e {
            fg_core::Error::Conflict(_) => {
                AppError::new(e).with_detail("Wait for the current job to finish")
            }
            other => AppError::new(other),
        })?;
    Ok(Json(snapshot))
}

/// GET /progress
pub async fn progress(State(ctx): State<AppContext>) -> Json<ProgressSnapshot> {
    Json(ctx.jobs.snapshot())
}
