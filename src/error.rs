// Privileged action error taxonomy
use std::collections::BTreeMap;
use thiserror::Error;

/// Why a secret check failed. Both block execution identically; the
/// distinction only changes the message shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretFailure {
    Unconfigured,
    Invalid,
}

/// Every failure a privileged action can report
#[derive(Debug, Error)]
pub enum ActionError {
    // 422 Unprocessable Entity
    #[error("{message}")]
    Validation {
        message: String,
        field_errors: BTreeMap<String, String>,
    },

    // 401 Unauthorized
    #[error("{}", unauthorized_message(.0))]
    Unauthorized(SecretFailure),

    // 403 Forbidden
    #[error("{0}")]
    NotAllowed(String),

    // 404 Not Found
    #[error("{0}")]
    NotFound(String),

    // 403 Forbidden (filesystem permissions)
    #[error("{0}")]
    NotWritable(String),

    // 502 Bad Gateway (external process issues)
    #[error("{0}")]
    ExternalToolFailed(String),

    // 500 Internal Server Error
    #[error("{0}")]
    ExecutionFailed(String),

    #[error("I/O error: {0}")]
    Io(std::io::Error),
}

fn unauthorized_message(failure: &SecretFailure) -> &'static str {
    match failure {
        SecretFailure::Unconfigured => {
            "Master password is not configured. Please set COMMAND_MASTER_PASSWORD."
        }
        SecretFailure::Invalid => "Invalid master password.",
    }
}

impl ActionError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ActionError::Validation { .. } => 422,
            ActionError::Unauthorized(_) => 401,
            ActionError::NotAllowed(_) => 403,
            ActionError::NotFound(_) => 404,
            ActionError::NotWritable(_) => 403,
            ActionError::ExternalToolFailed(_) => 502,
            ActionError::ExecutionFailed(_) => 500,
            ActionError::Io(_) => 500,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ActionError::Validation { .. } => "VALIDATION_ERROR",
            ActionError::Unauthorized(_) => "UNAUTHORIZED",
            ActionError::NotAllowed(_) => "NOT_ALLOWED",
            ActionError::NotFound(_) => "NOT_FOUND",
            ActionError::NotWritable(_) => "NOT_WRITABLE",
            ActionError::ExternalToolFailed(_) => "EXTERNAL_TOOL_FAILED",
            ActionError::ExecutionFailed(_) => "EXECUTION_FAILED",
            ActionError::Io(_) => "IO_ERROR",
        }
    }

    /// Field-level messages, when the failure is tied to input fields
    pub fn field_errors(&self) -> Option<BTreeMap<String, String>> {
        match self {
            ActionError::Validation { field_errors, .. } => Some(field_errors.clone()),
            ActionError::Unauthorized(failure) => {
                let mut fields = BTreeMap::new();
                fields.insert(
                    crate::gateway::SECRET_FIELD.to_string(),
                    unauthorized_message(failure).to_string(),
                );
                Some(fields)
            }
            _ => None,
        }
    }
}

// Static constructor methods
impl ActionError {
    pub fn validation(field_errors: BTreeMap<String, String>) -> Self {
        let message = field_errors
            .values()
            .next()
            .cloned()
            .unwrap_or_else(|| "The given data was invalid.".to_string());
        ActionError::Validation { message, field_errors }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.into(), message.into());
        Self::validation(field_errors)
    }

    pub fn not_allowed(message: impl Into<String>) -> Self {
        ActionError::NotAllowed(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ActionError::NotFound(message.into())
    }

    pub fn not_writable(message: impl Into<String>) -> Self {
        ActionError::NotWritable(message.into())
    }

    pub fn external_tool(message: impl Into<String>) -> Self {
        ActionError::ExternalToolFailed(message.into())
    }

    pub fn execution(message: impl Into<String>) -> Self {
        ActionError::ExecutionFailed(message.into())
    }
}

impl From<std::io::Error> for ActionError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ActionError::NotFound(err.to_string()),
            std::io::ErrorKind::PermissionDenied => ActionError::NotWritable(err.to_string()),
            _ => ActionError::Io(err),
        }
    }
}

// Engine error text is surfaced verbatim; operators are trusted.
impl From<sqlx::Error> for ActionError {
    fn from(err: sqlx::Error) -> Self {
        ActionError::ExecutionFailed(err.to_string())
    }
}

impl From<crate::database::DatabaseError> for ActionError {
    fn from(err: crate::database::DatabaseError) -> Self {
        match err {
            crate::database::DatabaseError::Sqlx(e) => e.into(),
            other => ActionError::ExecutionFailed(other.to_string()),
        }
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_variants_share_status_but_not_message() {
        let unconfigured = ActionError::Unauthorized(SecretFailure::Unconfigured);
        let invalid = ActionError::Unauthorized(SecretFailure::Invalid);
        assert_eq!(unconfigured.status_code(), 401);
        assert_eq!(invalid.status_code(), 401);
        assert!(unconfigured.to_string().contains("not configured"));
        assert_eq!(invalid.to_string(), "Invalid master password.");
        assert!(invalid.field_errors().unwrap().contains_key("master_password"));
    }

    #[test]
    fn io_errors_map_onto_taxonomy() {
        let missing: ActionError = std::io::Error::from(std::io::ErrorKind::NotFound).into();
        assert_eq!(missing.error_code(), "NOT_FOUND");
        let denied: ActionError = std::io::Error::from(std::io::ErrorKind::PermissionDenied).into();
        assert_eq!(denied.error_code(), "NOT_WRITABLE");
    }

    #[test]
    fn validation_message_is_first_field_error() {
        let err = ActionError::field("path", "File not allowed or does not exist.");
        assert_eq!(err.to_string(), "File not allowed or does not exist.");
        assert_eq!(err.status_code(), 422);
    }
}
