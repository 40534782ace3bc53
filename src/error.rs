use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::control::ControlError;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum LwsError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Control channel is closed")]
    ControlClosed,

    #[error("Persistence failed: {0}")]
    Persistence(StoreError),
}

impl From<ControlError> for LwsError {
    fn from(err: ControlError) -> Self {
        match err {
            ControlError::Closed => LwsError::ControlClosed,
            ControlError::Persistence(e) => LwsError::Persistence(e),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for LwsError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            LwsError::InvalidCommand(_) => (StatusCode::BAD_REQUEST, "INVALID_COMMAND"),
            LwsError::ControlClosed => (StatusCode::SERVICE_UNAVAILABLE, "CONTROL_CLOSED"),
            LwsError::Persistence(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_FAILED")
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code,
        };

        (status, Json(body)).into_response()
    }
}
