#![allow(dead_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use command_center::{
    app::app,
    config::{AppConfig, Environment},
    state::{AppState, SharedState},
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "correct-horse-battery";

/// One isolated project tree plus the router serving it
pub struct TestApp {
    pub dir: TempDir,
    pub state: SharedState,
    router: Router,
}

impl TestApp {
    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub async fn get(&self, uri: &str) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, Some(body)).await
    }

    /// Raw response body, for endpoints that do not answer with JSON
    pub async fn post_raw(&self, uri: &str, body: Value) -> Result<(StatusCode, Vec<u8>)> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))?;
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, bytes.to_vec()))
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = serde_json::from_slice(&bytes)
            .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?;
        Ok((status, json))
    }
}

/// Project tree with a config/ directory, a .env file and a log file
pub fn project() -> Result<TempDir> {
    let dir = TempDir::new()?;
    std::fs::create_dir_all(dir.path().join("config"))?;
    std::fs::create_dir_all(dir.path().join("storage/logs"))?;
    std::fs::write(dir.path().join("config/app.yml"), "name: demo\n")?;
    std::fs::write(dir.path().join(".env"), "APP_NAME=Demo\nAPP_DEBUG=true\n")?;
    let log: String = (1..=20).map(|i| format!("[2024-01-01] entry {}\n", i)).collect();
    std::fs::write(dir.path().join("storage/logs/app.log"), log)?;
    Ok(dir)
}

pub fn spawn_app(password: Option<&str>) -> Result<TestApp> {
    spawn_app_with(password, |_| {})
}

pub fn spawn_app_with(password: Option<&str>, customize: impl FnOnce(&mut AppConfig)) -> Result<TestApp> {
    let dir = project()?;
    let mut config = AppConfig::defaults(Environment::Development, dir.path());
    config.security.master_password = password.map(str::to_string);
    customize(&mut config);

    let state = AppState::from_config(config).shared();
    let router = app(state.clone());
    Ok(TestApp { dir, state, router })
}

/// `fields` plus a valid password and confirmation
pub fn authorized(fields: Value) -> Value {
    let mut body = fields;
    body["master_password"] = json!(PASSWORD);
    body["confirm"] = json!(true);
    body
}
