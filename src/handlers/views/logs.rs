// handlers/views/logs.rs - GET /logs handler

use axum::extract::State;
use serde_json::json;

use crate::middleware::ViewResponse;
use crate::services::log_tail::{DEFAULT_LINES, MAX_LINES};
use crate::state::SharedState;

pub async fn logs_view(State(state): State<SharedState>) -> ViewResponse {
    let path = &state.config.paths.log_path;
    ViewResponse(json!({
        "path": path,
        "exists": path.is_file(),
        "defaultLines": DEFAULT_LINES,
        "maxLines": MAX_LINES,
    }))
}
