// handlers/views/backups.rs - GET /backups handler

use axum::extract::State;
use serde_json::json;

use crate::middleware::ViewResponse;
use crate::state::SharedState;

pub async fn backups_list(State(state): State<SharedState>) -> ViewResponse {
    match state.backups.list() {
        Ok(backups) => ViewResponse(json!({ "backups": backups })),
        Err(e) => ViewResponse(json!({ "backups": [], "error": e.to_string() })),
    }
}
