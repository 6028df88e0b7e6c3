// handlers/actions/sql.rs - POST /sql/run handler

use axum::extract::State;

use crate::gateway::{Action, Envelope, FieldRules, Rule};
use crate::middleware::ActionInput;
use crate::services::sql_console;
use crate::state::SharedState;

pub fn action() -> Action {
    Action::new("sql", FieldRules::new().field("statement", [Rule::Required, Rule::String]))
        .messages("SQL statement executed.", "SQL execution failed.")
        .echo(&["statement"])
}

pub async fn sql_run(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    let database = &state.database;
    state
        .gateway
        .execute(&action(), &input, |req| async move {
            let pool = database.pool()?;
            sql_console::run_statement(pool, req.str("statement").unwrap_or_default()).await
        })
        .await
}
