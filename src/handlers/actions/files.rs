// handlers/actions/files.rs - POST /files/save handler

use axum::extract::State;
use serde_json::json;

use crate::gateway::{Action, Envelope, FieldRules, Rule};
use crate::middleware::ActionInput;
use crate::state::SharedState;

pub fn action() -> Action {
    Action::new(
        "files",
        FieldRules::new()
            .field("path", [Rule::Required, Rule::String])
            .field("content", [Rule::Nullable, Rule::String]),
    )
    .messages("File saved successfully.", "Unable to save file.")
    .echo(&["path"])
}

pub async fn file_save(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    let sandbox = &state.sandbox;
    state
        .gateway
        .execute(&action(), &input, |req| async move {
            let requested = req.string("path");
            let resolved = sandbox.resolve(&requested)?;
            sandbox.write(&resolved, &req.string("content"))?;
            Ok(json!({ "path": requested }))
        })
        .await
}
