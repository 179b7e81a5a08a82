//! Reference Auth Service.
//!
//! Implements the login/logout/registration contract the client flows consume,
//! backed by an in-memory user directory.

use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod directory;
pub mod handlers;
pub mod routes;

use crate::{
    config::AppConfig,
    models::{
        LoginRequest, LoginResponse, RegisterRequest, SessionUser, StatusResponse, UserId,
    },
};
use auth::{AuthUser, TokenIssuer};
use directory::DirectoryState;
use routes::{admin, authenticated, public};

/// ApiDoc
///
/// OpenAPI document for the Auth Service, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::register, handlers::logout,
        handlers::get_me, handlers::list_users
    ),
    components(
        schemas(
            LoginRequest, LoginResponse, RegisterRequest, SessionUser, StatusResponse, UserId
        )
    ),
    tags(
        (name = "student-hub", description = "Student Hub Auth Service")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared, cheaply clonable state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub directory: DirectoryState,
    pub tokens: TokenIssuer,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, directory: DirectoryState) -> Self {
        Self {
            tokens: TokenIssuer::new(&config.jwt_secret, config.token_ttl_secs),
            directory,
            config,
        }
    }
}

impl FromRef<AppState> for DirectoryState {
    fn from_ref(app_state: &AppState) -> DirectoryState {
        app_state.directory.clone()
    }
}

impl FromRef<AppState> for TokenIssuer {
    fn from_ref(app_state: &AppState) -> TokenIssuer {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with 401 unless `AuthUser` can be extracted: a bearer
/// token that verifies, is not revoked, and names an account that still exists.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles routes, middleware and state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS: the client may be served from any origin.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Routes, grouped by who may call them.
    let base_router = Router::new()
        // Swagger UI over the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // `route_layer` so unmatched paths still 404 instead of 401.
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        // Admin handlers authenticate through `AuthUser` and check the role themselves.
        .nest("/admin", admin::admin_routes())
        .with_state(state);

    // 3. Outer layers: tag every request with an id, trace it under that id,
    // and echo the id back on the response.
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span per request, tagged with the `x-request-id` set by the layer above.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
