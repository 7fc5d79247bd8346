use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State as AxumState,
    http::{Method, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

use super::state::State;
use crate::sync::Capabilities;
use crate::sync::relay::{RelayError, SavePayload, append_item, load_csv};

/// Append one item to the remote CSV. Only POST is accepted.
pub async fn save_handler(
    AxumState(state): AxumState<Arc<State>>,
    method: Method,
    body: Bytes,
) -> Result<impl IntoResponse, RelayError> {
    if method != Method::POST {
        return Err(RelayError::MethodNotAllowed);
    }

    let store = state.store()?;
    let payload = SavePayload::parse(&body)?;
    let result = append_item(store, &payload, state.csv_offset).await?;

    Ok((StatusCode::OK, Json(json!({ "ok": true, "result": result }))))
}

/// Return the decoded remote CSV text.
pub async fn load_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<impl IntoResponse, RelayError> {
    let csv = load_csv(state.store()?).await?;
    Ok((StatusCode::OK, Json(json!({ "csv": csv }))))
}

pub async fn capabilities_handler() -> impl IntoResponse {
    Json(Capabilities::APPEND_ONLY)
}
