use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::Value;

use feedlog_protocol::Envelope;

use crate::daemon::MemoryDaemon;
use crate::error::ServerError;

/// `GET /probe`
pub async fn probe_handler(State(daemon): State<MemoryDaemon>) -> Json<Value> {
    Json(daemon.probe())
}

/// `POST /feed/:endpoint`
pub async fn feed_handler(
    State(daemon): State<MemoryDaemon>,
    Path(endpoint): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    match daemon.handle(&endpoint, body).await {
        Ok(value) => Json(value).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_response(error: ServerError) -> Response {
    let status = match error {
        ServerError::UnknownEndpoint(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(Envelope::failure(error.to_string()))).into_response()
}
