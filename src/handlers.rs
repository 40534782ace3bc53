use axum::{
    Json,
    body::Body,
    extract::{Query, Request, State, rejection::JsonRejection},
    http::{Method, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AppState;
use crate::control::Command;
use crate::error::LwsError;
use crate::gate::Phase;
use crate::root::RootHandle;
use crate::router::{FileResponse, Interception};

/// Query parameters for the command endpoint
#[derive(Debug, Deserialize)]
pub struct CommandQuery {
    /// Wait until the command has been applied and persisted
    #[serde(default)]
    pub wait: bool,
}

/// Response for accepted commands
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub phase: Phase,
    pub prefixes: usize,
}

/// One registry entry
#[derive(Debug, Serialize)]
pub struct RootsEntry {
    pub prefix: String,
    pub roots: Vec<RootHandle>,
}

impl IntoResponse for FileResponse {
    fn into_response(self) -> Response {
        match self {
            FileResponse::Found {
                content_type, body, ..
            } => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type)],
                Body::from(body),
            )
                .into_response(),
            FileResponse::NotFound => not_found_response(),
        }
    }
}

fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Not found",
    )
        .into_response()
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        phase: state.lws.phase(),
        prefixes: state.lws.snapshot().await.len(),
    })
}

/// List registered prefixes and their roots
pub async fn list_roots(State(state): State<AppState>) -> Json<Vec<RootsEntry>> {
    let snapshot = state.lws.snapshot().await;
    let entries = snapshot
        .iter()
        .map(|(prefix, roots)| RootsEntry {
            prefix: prefix.to_string(),
            roots: roots.to_vec(),
        })
        .collect();
    Json(entries)
}

/// Submit a control command
///
/// Commands are queued and applied in arrival order. Without `wait` the
/// response is `202 Accepted` as soon as the command is queued.
pub async fn post_command(
    State(state): State<AppState>,
    Query(query): Query<CommandQuery>,
    payload: Result<Json<Command>, JsonRejection>,
) -> Result<Response, LwsError> {
    let Json(command) = payload.map_err(|e| LwsError::InvalidCommand(e.body_text()))?;

    if query.wait {
        state.lws.control().apply(command).await?;
        return Ok((
            StatusCode::OK,
            Json(SuccessResponse {
                success: true,
                message: "applied".to_string(),
            }),
        )
            .into_response());
    }

    state.lws.control().send(command)?;
    Ok((
        StatusCode::ACCEPTED,
        Json(SuccessResponse {
            success: true,
            message: "queued".to_string(),
        }),
    )
        .into_response())
}

/// Interception middleware
///
/// Reads under a registered prefix are answered from the roots; everything
/// else continues to the regular routes.
pub async fn intercept(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method();
    if method != Method::GET && method != Method::HEAD {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    if state.config.is_control_path(&path) {
        return next.run(request).await;
    }

    match state.lws.handle_request(&path).await {
        Interception::Passthrough => {
            debug!("Passing through {}", path);
            next.run(request).await
        }
        Interception::Respond(response) => response.into_response(),
    }
}

/// Fallback for requests nothing handled
pub async fn not_found() -> Response {
    not_found_response()
}
