//! External tool availability.

use axum::extract::State;
use axum::Json;

use crate::context::AppContext;

/// GET /api/tools
pub async fn tools(State(ctx): State<AppContext>) -> Json<Vec<fg_av::ToolInfo>> {
    let tools = ctx.tools.clone();
    // check_all runs `ffmpeg -version` synchronously.
    let infos = tokio::task::spawn_blocking(move || tools.check_all())
        .await
        .unwrap_or_default();
    Json(infos)
}
