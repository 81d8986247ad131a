//! Router construction
//!
//! Wires the handlers, permissive CORS (the frontend is served from another
//! origin), HTTP tracing and request IDs into one `Router`.

use crate::handlers::{self, AppState};
use crate::middleware::request_id_middleware;
use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the application router around `state`
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(handlers::chat::handler))
        .route("/health", get(handlers::health::handler))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
