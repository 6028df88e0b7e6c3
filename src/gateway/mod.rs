// gateway/mod.rs - Privileged Action Gateway
//
// Every mutating action runs through `Gateway::execute`:
//   Received -> Validated -> Authorized -> Executed -> Responded
// with a short-circuit to an error envelope at validation (bad shape) or
// authorization (secret/confirmation). The domain operation only ever
// sees the validated request with the secret and confirmation removed.

pub mod envelope;
pub mod rules;
pub mod secret;

use serde::Serialize;
use serde_json::{Map, Value};
use std::future::Future;
use tracing::{info, warn};

use crate::error::{ActionError, ActionResult};

pub use envelope::{Envelope, EnvelopeKind};
pub use rules::{FieldRules, Rule};

pub const SECRET_FIELD: &str = "master_password";
pub const CONFIRM_FIELD: &str = "confirm";
pub const SECRET_MIN_LENGTH: usize = 8;

const CONFIRM_MESSAGE: &str = "Please confirm that you understand this action.";

/// Validated, secret-free input for one operation
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    fields: Map<String, Value>,
}

impl ActionRequest {
    pub fn str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn string(&self, name: &str) -> String {
        self.str(name).unwrap_or_default().to_string()
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(Value::as_i64)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    fn echo(&self, only: Option<&[&str]>) -> Map<String, Value> {
        match only {
            Some(names) => self
                .fields
                .iter()
                .filter(|(k, _)| names.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            None => self.fields.clone(),
        }
    }
}

/// Static description of one privileged action
#[derive(Debug, Clone)]
pub struct Action {
    pub context: &'static str,
    pub rules: FieldRules,
    pub success_message: &'static str,
    pub failure_message: &'static str,
    /// Fields echoed back in an error payload; `None` echoes all of them.
    pub echo: Option<&'static [&'static str]>,
}

impl Action {
    pub fn new(context: &'static str, rules: FieldRules) -> Self {
        Self {
            context,
            rules,
            success_message: "Action completed.",
            failure_message: "Action failed.",
            echo: None,
        }
    }

    pub fn messages(mut self, success: &'static str, failure: &'static str) -> Self {
        self.success_message = success;
        self.failure_message = failure;
        self
    }

    pub fn echo(mut self, fields: &'static [&'static str]) -> Self {
        self.echo = Some(fields);
        self
    }
}

pub struct Gateway {
    master_secret: Option<String>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("master_secret_set", &self.master_secret.is_some())
            .finish()
    }
}

impl Gateway {
    pub fn new(master_secret: Option<String>) -> Self {
        Self {
            master_secret: master_secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn secret_configured(&self) -> bool {
        self.master_secret.is_some()
    }

    /// File content with the master secret masked out
    pub fn redact(&self, content: &str) -> String {
        secret::redact(content, self.master_secret.as_deref())
    }

    pub fn redact_value(&self, key: &str, value: &str) -> String {
        secret::redact_value(key, value, self.master_secret.as_deref())
    }

    /// Validate shape, check the secret and strip it. Nothing else runs.
    pub fn authorize(&self, action: &Action, raw: &Map<String, Value>) -> ActionResult<ActionRequest> {
        let rules = action
            .rules
            .clone()
            .field(SECRET_FIELD, [Rule::Required, Rule::String, Rule::MinLength(SECRET_MIN_LENGTH)])
            .field(CONFIRM_FIELD, [Rule::Accepted]);

        let mut fields = rules.validate(raw).map_err(|mut errors| {
            if errors.contains_key(CONFIRM_FIELD) {
                errors.insert(CONFIRM_FIELD.to_string(), CONFIRM_MESSAGE.to_string());
            }
            ActionError::validation(errors)
        })?;

        let supplied = fields.remove(SECRET_FIELD);
        fields.remove(CONFIRM_FIELD);

        secret::verify(self.master_secret.as_deref(), supplied.as_ref().and_then(Value::as_str))
            .map_err(ActionError::Unauthorized)?;

        Ok(ActionRequest { fields })
    }

    /// Run `operation` exactly once if the request is valid and
    /// authorized, and fold whatever happens into an envelope.
    pub async fn execute<F, Fut, T>(&self, action: &Action, raw: &Map<String, Value>, operation: F) -> Envelope
    where
        F: FnOnce(ActionRequest) -> Fut,
        Fut: Future<Output = ActionResult<T>>,
        T: Serialize,
    {
        let request = match self.authorize(action, raw) {
            Ok(request) => request,
            Err(e) => {
                warn!(context = action.context, code = e.error_code(), "Privileged action rejected");
                return Envelope::rejected(action.context, &e);
            }
        };

        let echo = request.echo(action.echo);

        let outcome = operation(request).await.and_then(|result| {
            serde_json::to_value(result)
                .map_err(|e| ActionError::execution(format!("Failed to serialize result: {}", e)))
        });

        match outcome {
            Ok(payload) => {
                info!(context = action.context, input = ?echo, "Privileged action executed");
                Envelope::success(action.context, payload, action.success_message)
            }
            Err(e) => {
                warn!(context = action.context, input = ?echo, error = %e, "Privileged action failed");
                Envelope::failure(action.context, echo, action.failure_message, &e)
            }
        }
    }
}
