use axum::{Router, routing::get};

use crate::server::{AppState, handlers};

/// Admin Router Module
///
/// Nested under '/admin'. Each handler checks the caller's role.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/users
        .route("/users", get(handlers::list_users))
}
