mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{authorized, spawn_app, spawn_app_with, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn tails_the_configured_log() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;

    let (status, body) = app.post("/command/logs/tail", authorized(json!({"lines": 2}))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["payload"]["lines"], 2);
    assert_eq!(body["payload"]["content"], "[2024-01-01] entry 19\n[2024-01-01] entry 20");

    let (_, body) = app.post("/command/logs/tail", authorized(json!({}))).await?;
    assert_eq!(body["payload"]["lines"], 200);
    Ok(())
}

#[tokio::test]
async fn missing_log_is_reported() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;
    std::fs::remove_file(app.path("storage/logs/app.log"))?;

    let (status, body) = app.post("/command/logs/tail", authorized(json!({"lines": "5"}))).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["payload"]["error"], "Log file not found.");
    assert_eq!(body["payload"]["lines"], 5);
    Ok(())
}

#[tokio::test]
async fn unknown_git_actions_and_tasks_are_rejected_before_running() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;

    let (status, body) = app.post("/command/git/action", authorized(json!({"action": "push"}))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["errors"]["action"].is_string());

    let (status, _) = app.post("/command/maintenance/run", authorized(json!({"task": "migrate:fresh"}))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn console_without_configuration_is_a_tool_failure() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;

    let (status, body) = app.post("/command/artisan/run", authorized(json!({"command": "cache:clear"}))).await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "EXTERNAL_TOOL_FAILED");
    assert_eq!(body["payload"]["command"], "cache:clear");
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn maintenance_runs_the_mapped_console_command() -> Result<()> {
    let app = spawn_app_with(Some(PASSWORD), |config| config.tools.console = Some("echo artisan".to_string()))?;

    let (status, body) = app.post("/command/maintenance/run", authorized(json!({"task": "cache-clear"}))).await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["payload"]["output"], "artisan cache:clear");
    assert_eq!(body["message"], "Maintenance task completed.");
    Ok(())
}

#[tokio::test]
async fn sql_without_database_fails_cleanly() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;

    let (status, body) = app.post("/command/sql/run", authorized(json!({"statement": "SELECT 1;"}))).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "SQL execution failed.");
    assert_eq!(body["payload"]["statement"], "SELECT 1;");
    Ok(())
}

#[tokio::test]
async fn custom_route_prefix_is_honored() -> Result<()> {
    let app = spawn_app_with(Some(PASSWORD), |config| config.server.route_prefix = "/ops".to_string())?;

    let (status, _) = app.get("/ops/logs").await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
