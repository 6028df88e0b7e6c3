// handlers/actions/queues.rs - POST /queues/flush-failed and /queues/clear-pending handlers

use axum::extract::State;

use crate::gateway::{Action, Envelope, FieldRules};
use crate::middleware::ActionInput;
use crate::services::queues;
use crate::state::SharedState;

fn flush_action() -> Action {
    Action::new("queues", FieldRules::new()).messages("Failed jobs cleared.", "Unable to clear failed jobs.")
}

fn clear_action() -> Action {
    Action::new("queues", FieldRules::new()).messages("Pending jobs table cleared.", "Unable to clear pending jobs.")
}

pub async fn queues_flush_failed(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    let database = &state.database;
    state
        .gateway
        .execute(&flush_action(), &input, |_| async move { queues::flush_failed(database.pool()?).await })
        .await
}

pub async fn queues_clear_pending(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    let database = &state.database;
    state
        .gateway
        .execute(&clear_action(), &input, |_| async move { queues::clear_pending(database.pool()?).await })
        .await
}
