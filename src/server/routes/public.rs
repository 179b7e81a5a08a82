use axum::{
    Router,
    routing::{get, post},
};

use crate::server::{AppState, handlers};

/// Public Router Module
///
/// Unauthenticated endpoints.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // Credential exchange; see `LoginResponse` for the reply contract.
        .route("/login", post(handlers::login))
        // POST /register
        // Self-service student registration.
        .route("/register", post(handlers::register))
}
