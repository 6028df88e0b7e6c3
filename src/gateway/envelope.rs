use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

use crate::error::ActionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeKind {
    Success,
    Error,
}

/// Uniform result of every privileged action, whatever the transport
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub context: String,
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,
    pub message: String,
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    #[serde(skip)]
    pub status: u16,
}

impl Envelope {
    pub fn success(context: &str, payload: Value, message: &str) -> Self {
        Self {
            context: context.to_string(),
            kind: EnvelopeKind::Success,
            message: message.to_string(),
            payload,
            code: None,
            errors: None,
            status: 200,
        }
    }

    /// The operation ran and failed. `echo` is the secret-free input that
    /// is reported back next to the failure detail.
    pub fn failure(context: &str, mut echo: Map<String, Value>, message: &str, error: &ActionError) -> Self {
        echo.insert("error".to_string(), Value::String(error.to_string()));
        Self {
            context: context.to_string(),
            kind: EnvelopeKind::Error,
            message: message.to_string(),
            payload: Value::Object(echo),
            code: Some(error.error_code()),
            errors: error.field_errors(),
            status: error.status_code(),
        }
    }

    /// The request never reached the operation (bad shape or bad secret).
    pub fn rejected(context: &str, error: &ActionError) -> Self {
        Self {
            context: context.to_string(),
            kind: EnvelopeKind::Error,
            message: error.to_string(),
            payload: json!({}),
            code: Some(error.error_code()),
            errors: error.field_errors(),
            status: error.status_code(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == EnvelopeKind::Success
    }
}
