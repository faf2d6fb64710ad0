//! Error-to-HTTP response conversion.
//!
//! Route handlers return `Result<T, AppError>`; any [`fg_core::Error`]
//! converts with `?`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
#[derive(Debug)]
pub struct AppError {
    inner: fg_core::Error,
    detail: Option<String>,
}

impl AppError {
    pub fn new(inner: fg_core::Error) -> Self {
        Self {
            inner,
            detail: None,
        }
    }

    /// Attach a hint shown to the user next to the error.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<fg_core::Error> for AppError {
    fn from(e: fg_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner.trace(),
                "Server error in API handler"
            );
        }

        let body = json!({
            "success": false,
            "error": self.inner.to_string(),
            "code": self.inner.code(),
            "detail": self.detail,
        });

        (status, axum::Json(body)).into_response()
    }
}
