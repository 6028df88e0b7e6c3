// handlers/actions/git.rs - POST /git/action handler

use axum::extract::State;

use crate::gateway::{Action, Envelope, FieldRules, Rule};
use crate::middleware::ActionInput;
use crate::services::git::GIT_ACTIONS;
use crate::state::SharedState;

pub fn action() -> Action {
    Action::new(
        "git",
        FieldRules::new()
            .field("action", [Rule::Required, Rule::OneOf(GIT_ACTIONS)])
            .field("branch", [Rule::Nullable, Rule::String, Rule::MaxLength(255)]),
    )
    .messages("Git command executed.", "Git command failed.")
    .echo(&["action"])
}

pub async fn git_action(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    let git = &state.git;
    state
        .gateway
        .execute(&action(), &input, |req| async move {
            git.run_action(req.str("action").unwrap_or_default(), req.str("branch")).await
        })
        .await
}
