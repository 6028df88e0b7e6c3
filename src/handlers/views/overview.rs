// handlers/views/overview.rs - GET / handler

use axum::extract::State;
use serde_json::json;

use crate::gateway::{CONFIRM_FIELD, SECRET_FIELD};
use crate::middleware::ViewResponse;
use crate::services::console::MAINTENANCE_TASKS;
use crate::services::git::GIT_ACTIONS;
use crate::state::SharedState;

pub async fn overview(State(state): State<SharedState>) -> ViewResponse {
    let config = &state.config;

    let database = match (&config.database, &config.database_error) {
        (Some(info), _) => json!({
            "engine": info.engine,
            "host": info.host,
            "port": info.port,
            "database": info.database,
            "username": info.username,
        }),
        (None, reason) => json!({ "error": reason }),
    };

    ViewResponse(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": config.environment,
        "masterPasswordConfigured": state.gateway.secret_configured(),
        "fields": { "secret": SECRET_FIELD, "confirm": CONFIRM_FIELD },
        "database": database,
        "git": state.git.info().await,
        "gitActions": GIT_ACTIONS,
        "defaultBranch": state.git.default_branch(),
        "maintenanceTasks": MAINTENANCE_TASKS,
        "consoleConfigured": state.console.configured(),
    }))
}
