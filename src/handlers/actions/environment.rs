// handlers/actions/environment.rs - POST /environment/upsert handler

use axum::extract::State;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::gateway::{Action, Envelope, FieldRules, Rule};
use crate::middleware::ActionInput;
use crate::state::SharedState;

static KEY_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z0-9_.]+$").expect("env key pattern"));

pub fn action() -> Action {
    Action::new(
        "environment",
        FieldRules::new()
            .field(
                "key",
                [
                    Rule::Required,
                    Rule::String,
                    Rule::MaxLength(255),
                    Rule::Pattern(KEY_PATTERN.clone()),
                ],
            )
            .field("value", [Rule::Nullable, Rule::String, Rule::MaxLength(5000)]),
    )
    .messages("Environment variable saved.", "Unable to update .env file.")
    .echo(&["key"])
}

pub async fn environment_upsert(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    let env_file = &state.env_file;
    state
        .gateway
        .execute(&action(), &input, |req| async move {
            let key = req.string("key");
            let value = req.string("value");
            env_file.write_value(&key, Some(&value))?;
            Ok(json!({ "key": key, "value": value }))
        })
        .await
}
