use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::ALLOW},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::sync::StoreError;
use crate::sync::relay::RelayError;

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::InvalidPayload => StatusCode::BAD_REQUEST,
            RelayError::NotFound { status } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            RelayError::Store(StoreError::Conflict { .. }) => StatusCode::CONFLICT,
            RelayError::MissingConfig | RelayError::Store(_) | RelayError::Sheet(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("save-csv error: {}", self);
        } else {
            log::info!("Rejected request: {}", self);
        }

        let body = match &self {
            RelayError::Store(e) if e.is_conflict() => {
                json!({ "error": self.to_string(), "conflict": true })
            }
            _ => json!({ "error": self.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, RelayError::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}
