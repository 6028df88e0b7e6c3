use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Map, Value};

use crate::gateway::Envelope;

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Raw input of a privileged action: a JSON object, or nothing at all
/// (actions without fields still need the secret, so an empty body
/// simply fails validation later).
#[derive(Debug, Default)]
pub struct ActionInput(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for ActionInput
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            Ok(_) => Err(malformed("Request body must be a JSON object.")),
            Err(e) => Err(malformed(&format!("Malformed JSON body: {}", e))),
        }
    }
}

fn malformed(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "type": "error",
            "code": "MALFORMED_REQUEST",
            "message": message,
        })),
    )
        .into_response()
}

/// Wrapper for read-only views
#[derive(Debug)]
pub struct ViewResponse(pub Value);

impl IntoResponse for ViewResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self.0)).into_response()
    }
}
