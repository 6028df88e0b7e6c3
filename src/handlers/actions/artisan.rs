// handlers/actions/artisan.rs - POST /artisan/run handler

use axum::extract::State;

use crate::gateway::{Action, Envelope, FieldRules, Rule};
use crate::middleware::ActionInput;
use crate::state::SharedState;

pub fn action() -> Action {
    Action::new(
        "artisan",
        FieldRules::new().field("command", [Rule::Required, Rule::String, Rule::MaxLength(255)]),
    )
    .messages("Command executed successfully.", "Failed to run artisan command.")
    .echo(&["command"])
}

pub async fn artisan_run(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    let console = &state.console;
    state
        .gateway
        .execute(&action(), &input, |req| async move { console.run(req.str("command").unwrap_or_default()).await })
        .await
}
