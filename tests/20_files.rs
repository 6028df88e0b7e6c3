mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{authorized, spawn_app, PASSWORD};
use serde_json::json;

#[tokio::test]
async fn saves_whitelisted_file() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;

    let (status, body) = app
        .post("/command/files/save", authorized(json!({"path": "config/app.yml", "content": "name: changed\n"})))
        .await?;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["type"], "success");
    assert_eq!(body["message"], "File saved successfully.");
    assert_eq!(body["payload"]["path"], "config/app.yml");
    assert_eq!(std::fs::read_to_string(app.path("config/app.yml"))?, "name: changed\n");
    Ok(())
}

#[tokio::test]
async fn traversal_outside_roots_is_not_allowed() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;
    std::fs::write(app.path("secret.txt"), "top secret")?;

    for path in ["../../etc/passwd", "config/../secret.txt", "secret.txt", "config"] {
        let (status, body) = app
            .post("/command/files/save", authorized(json!({"path": path, "content": "x"})))
            .await?;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path}");
        assert_eq!(body["code"], "NOT_ALLOWED");
        assert_eq!(body["payload"]["error"], "File not allowed or does not exist.");
        assert_eq!(body["payload"]["path"], path);
    }

    assert_eq!(std::fs::read_to_string(app.path("secret.txt"))?, "top secret");
    Ok(())
}

#[tokio::test]
async fn env_file_root_matches_by_key() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;

    let (status, _) = app
        .post("/command/files/save", authorized(json!({"path": "env", "content": "APP_NAME=Edited\n"})))
        .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(std::fs::read_to_string(app.path(".env"))?, "APP_NAME=Edited\n");
    Ok(())
}

#[tokio::test]
async fn file_index_lists_roots_and_selected_content() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;

    let (status, body) = app.get("/command/files?path=config/app.yml").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["selected"]["content"], "name: demo\n");

    let groups = body["groups"].as_array().cloned().unwrap_or_default();
    let config = groups.iter().find(|g| g["group"] == "Config").expect("config group");
    assert_eq!(config["files"][0]["relative"], "config/app.yml");

    let (_, body) = app.get("/command/files?path=../../etc/passwd").await?;
    assert_eq!(body["selected"]["error"], "File not allowed or does not exist.");
    Ok(())
}

#[tokio::test]
async fn environment_upsert_replaces_and_lists() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;

    let (status, body) = app
        .post("/command/environment/upsert", authorized(json!({"key": "APP_NAME", "value": "My App"})))
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["payload"], json!({"key": "APP_NAME", "value": "My App"}));

    let (_, body) = app
        .post("/command/environment/upsert", authorized(json!({"key": "NEW_KEY", "value": null})))
        .await?;
    assert_eq!(body["type"], "success");

    let content = std::fs::read_to_string(app.path(".env"))?;
    assert_eq!(content, "APP_NAME=\"My App\"\nAPP_DEBUG=true\n\nNEW_KEY=");

    let (_, body) = app.get("/command/environment").await?;
    assert_eq!(body["entries"][0], json!({"key": "APP_NAME", "value": "My App"}));
    assert_eq!(body["entries"][2], json!({"key": "NEW_KEY", "value": ""}));
    Ok(())
}

#[tokio::test]
async fn views_never_reveal_the_master_password() -> Result<()> {
    let app = spawn_app(Some(PASSWORD))?;
    std::fs::write(
        app.path(".env"),
        format!("APP_NAME=Demo\nCOMMAND_MASTER_PASSWORD={PASSWORD}\nMAIL_PASSWORD=\"{PASSWORD}\"\n"),
    )?;

    let (status, body) = app.get("/command/environment").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.to_string().contains(PASSWORD), "{body}");
    assert_eq!(body["entries"][0], json!({"key": "APP_NAME", "value": "Demo"}));
    assert_eq!(body["entries"][1], json!({"key": "COMMAND_MASTER_PASSWORD", "value": "********"}));
    assert_eq!(body["entries"][2], json!({"key": "MAIL_PASSWORD", "value": "********"}));

    let (status, body) = app.get("/command/files?path=env").await?;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.to_string().contains(PASSWORD), "{body}");
    assert_eq!(
        body["selected"]["content"],
        "APP_NAME=Demo\nCOMMAND_MASTER_PASSWORD=********\nMAIL_PASSWORD=\"********\"\n"
    );
    Ok(())
}
