// handlers/actions/maintenance.rs - POST /maintenance/run handler

use axum::extract::State;
use serde_json::json;

use crate::error::ActionError;
use crate::gateway::{Action, Envelope, FieldRules, Rule};
use crate::middleware::ActionInput;
use crate::services::console::{maintenance_command, MAINTENANCE_TASKS};
use crate::state::SharedState;

pub fn action() -> Action {
    Action::new(
        "maintenance",
        FieldRules::new().field("task", [Rule::Required, Rule::OneOf(MAINTENANCE_TASKS)]),
    )
        .messages("Maintenance task completed.", "Maintenance command failed.")
        .echo(&["task"])
}

pub async fn maintenance_run(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    let console = &state.console;
    state
        .gateway
        .execute(&action(), &input, |req| async move {
            let task = req.string("task");
            let command = maintenance_command(&task)
                .ok_or_else(|| ActionError::field("task", "The selected task is invalid."))?;
            let run = console.run(command).await?;
            Ok(json!({ "task": task, "exitCode": run.exit_code, "output": run.output }))
        })
        .await
}
