use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::handlers;

/// Create control API routes
pub fn control_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/roots", get(handlers::list_roots))
        .route("/commands", post(handlers::post_command))
}

/// Create the full application: control API plus request interception
pub fn app(state: AppState) -> Router {
    let control_path = state.config.control_path.clone();

    Router::new()
        .nest(&control_path, control_routes())
        .fallback(handlers::not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::intercept,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
