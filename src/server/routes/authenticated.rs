use axum::{
    Router,
    routing::{get, post},
};

use crate::server::{AppState, handlers};

/// Authenticated Router Module
///
/// Endpoints for any caller holding a valid, unrevoked session token.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /logout
        // Revokes the presented token. The client clears its session regardless.
        .route("/logout", post(handlers::logout))
        // GET /me
        .route("/me", get(handlers::get_me))
}
