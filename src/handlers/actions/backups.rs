// handlers/actions/backups.rs - backup create/restore/delete/download handlers

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use crate::gateway::{Action, Envelope, FieldRules, Rule};
use crate::middleware::ActionInput;
use crate::state::{AppState, SharedState};

const CONTEXT: &str = "backups";

pub fn run_action() -> Action {
    Action::new(
        CONTEXT,
        FieldRules::new().field("label", [Rule::Nullable, Rule::String, Rule::MaxLength(60)]),
    )
    .messages("Database backup created.", "Failed to create backup.")
    .echo(&[])
}

fn file_action(success: &'static str, failure: &'static str) -> Action {
    Action::new(CONTEXT, FieldRules::new().field("file", [Rule::Required, Rule::String]))
        .messages(success, failure)
        .echo(&["file"])
}

pub fn restore_action() -> Action {
    file_action("Database restored from backup.", "Restore failed.")
}

pub fn delete_action() -> Action {
    file_action("Backup deleted.", "Unable to delete backup.")
}

/// Gated snapshot, shared by the HTTP route and the CLI
pub async fn create_backup(state: &AppState, input: &Map<String, Value>) -> Envelope {
    let (backups, database) = (&state.backups, &state.database);
    state
        .gateway
        .execute(&run_action(), input, |req| async move {
            let record = backups.create(database, req.str("label")).await?;
            Ok(json!({ "file": record.filename, "size": record.size_bytes }))
        })
        .await
}

pub async fn restore_backup(state: &AppState, input: &Map<String, Value>) -> Envelope {
    let (backups, database) = (&state.backups, &state.database);
    state
        .gateway
        .execute(&restore_action(), input, |req| async move {
            let file = req.string("file");
            backups.restore(database, &file).await?;
            Ok(json!({ "file": file }))
        })
        .await
}

pub async fn delete_backup(state: &AppState, input: &Map<String, Value>) -> Envelope {
    let backups = &state.backups;
    state
        .gateway
        .execute(&delete_action(), input, |req| async move {
            let file = req.string("file");
            backups.delete(&file)?;
            Ok(json!({ "file": file }))
        })
        .await
}

/// POST /backups/run
pub async fn backup_run(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    create_backup(&state, &input).await
}

/// POST /backups/restore
pub async fn backup_restore(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    restore_backup(&state, &input).await
}

/// DELETE /backups/delete
pub async fn backup_delete(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Envelope {
    delete_backup(&state, &input).await
}

/// POST /backups/download - the file itself on success, an envelope otherwise
pub async fn backup_download(State(state): State<SharedState>, ActionInput(input): ActionInput) -> Response {
    let action = file_action("Backup downloaded.", "Unable to download backup.");

    let request = match state.gateway.authorize(&action, &input) {
        Ok(request) => request,
        Err(e) => {
            warn!(context = CONTEXT, code = e.error_code(), "Privileged action rejected");
            return Envelope::rejected(CONTEXT, &e).into_response();
        }
    };

    let file = request.string("file");
    let contents = match state.backups.resolve(&file) {
        Ok(path) => tokio::fs::read(&path).await.map_err(Into::into),
        Err(e) => Err(e),
    };

    match contents {
        Ok(bytes) => {
            info!(context = CONTEXT, file = %file, "Backup downloaded");
            let disposition = format!("attachment; filename=\"{}\"", file.replace('"', ""));
            (
                [
                    (header::CONTENT_TYPE, "application/sql".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            warn!(context = CONTEXT, file = %file, error = %e, "Backup download failed");
            let mut echo = Map::new();
            echo.insert("file".to_string(), Value::String(file));
            Envelope::failure(CONTEXT, echo, action.failure_message, &e).into_response()
        }
    }
}
