// handlers/views/environment.rs - GET /environment handler

use axum::extract::State;
use serde_json::json;

use crate::middleware::ViewResponse;
use crate::services::EnvEntry;
use crate::state::SharedState;

pub async fn environment_list(State(state): State<SharedState>) -> ViewResponse {
    match state.env_file.read_entries() {
        Ok(entries) => {
            let entries: Vec<EnvEntry> = entries
                .into_iter()
                .map(|entry| EnvEntry {
                    value: state.gateway.redact_value(&entry.key, &entry.value),
                    key: entry.key,
                })
                .collect();
            ViewResponse(json!({ "path": state.env_file.path(), "entries": entries }))
        }
        Err(e) => ViewResponse(json!({ "path": state.env_file.path(), "entries": [], "error": e.to_string() })),
    }
}
