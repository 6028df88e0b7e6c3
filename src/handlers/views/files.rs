// handlers/views/files.rs - GET /files handler
//
// Lists editable files per root. With `?path=` the file is resolved
// through the sandbox and its content is included, with the master
// secret masked.

use axum::extract::{Query, State};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::middleware::ViewResponse;
use crate::state::SharedState;

const FILES_PER_ROOT: usize = 200;

#[derive(Debug, Deserialize)]
pub struct FilesQuery {
    pub path: Option<String>,
}

pub async fn files_index(State(state): State<SharedState>, Query(query): Query<FilesQuery>) -> ViewResponse {
    let sandbox = &state.sandbox;
    let groups = sandbox.index(FILES_PER_ROOT);

    let selected = match query.path.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(requested) => match sandbox.resolve(requested).and_then(|resolved| sandbox.read(&resolved)) {
            Ok(content) => json!({ "path": requested, "content": state.gateway.redact(&content) }),
            Err(e) => json!({ "path": requested, "error": e.to_string() }),
        },
        None => Value::Null,
    };

    ViewResponse(json!({ "groups": groups, "selected": selected }))
}
