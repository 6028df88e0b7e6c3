// handlers/actions/logs.rs - POST /logs/tail handler

use axum::extract::State;

use crate::gateway::{Action, Envelope, FieldRules, Rule};
use crate::middleware::ActionInput;
use crate::services::log_tail::{self, DEFAULT_LINES, MAX_LINES};
use crate::state::SharedState;

pub fn action() -> Action {
    Action::new(
        "logs",
        FieldRules::new().field(
            "lines",
            [Rule::Nullable, Rule::Integer, Rule::Min(1), Rule::Max(MAX_LINES as i64)],
        ),
    )
    .messages("Fetched latest log lines.", "Unable to read log file.")
    .echo(&["lines"])
}

pub async fn logs_tail(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    let log_path = state.config.paths.log_path.clone();
    state
        .gateway
        .execute(&action(), &input, |req| async move {
            let lines = req.i64("lines").map_or(DEFAULT_LINES, |n| n as usize);
            tokio::task::spawn_blocking(move || log_tail::tail(&log_path, lines))
                .await
                .map_err(|e| crate::error::ActionError::execution(e.to_string()))?
        })
        .await
}
