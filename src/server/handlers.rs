use axum::{Json, extract::State, http::StatusCode};
use uuid::Uuid;

use super::{
    AppState,
    auth::AuthUser,
    directory::{UserRecord, hash_password, normalize_email, verify_password},
};
use crate::{
    error::DirectoryError,
    flows::Credentials,
    models::{LoginRequest, LoginResponse, RegisterRequest, SessionUser, StatusResponse},
    role::{ROLE_ADMIN, ROLE_MASTER, ROLE_USER, is_role_allowed},
};

/// login
///
/// [Public Route] Verifies credentials and issues a session token.
/// Refusals use the same body shape as success, with `success: false`.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Unknown email or incorrect password", body = LoginResponse),
        (status = 422, description = "Missing email or password", body = LoginResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> (StatusCode, Json<LoginResponse>) {
    let email = normalize_email(&payload.email);
    if email.is_empty() || payload.password.is_empty() {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(LoginResponse::rejected("Email and password are required")),
        );
    }

    let Some(user) = state.directory.find_by_email(&email).await else {
        tracing::info!(%email, "login for unknown account");
        return (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse::rejected("No account found for that email")),
        );
    };

    if !verify_password(&payload.password, &user.password_hash) {
        tracing::info!(user_id = %user.id, "login with incorrect password");
        return (
            StatusCode::UNAUTHORIZED,
            Json(LoginResponse::rejected("Incorrect password")),
        );
    }

    match state.tokens.issue(&user) {
        Ok(token) => {
            let redirect = state.config.landing.landing_for(&user.role).to_string();
            tracing::info!(user_id = %user.id, role = %user.role, "session issued");
            (
                StatusCode::OK,
                Json(LoginResponse::accepted(
                    user.to_session_user(),
                    token,
                    Some(redirect),
                )),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to sign session token");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LoginResponse::rejected("Could not start a session")),
            )
        }
    }
}

/// register
///
/// [Public Route] Creates a student ('user') account. Does not sign in.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = SessionUser),
        (status = 409, description = "Email already registered", body = StatusResponse),
        (status = 422, description = "Invalid input", body = StatusResponse)
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionUser>), (StatusCode, Json<StatusResponse>)> {
    Credentials::new(payload.email.as_str(), payload.password.as_str())
        .validate()
        .map_err(|errors| {
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(StatusResponse::failed(errors.to_string())),
            )
        })?;

    let password_hash = hash_password(&payload.password, state.config.bcrypt_cost).map_err(|e| {
        tracing::error!(error = %e, "password hashing failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(StatusResponse::failed("Registration failed")),
        )
    })?;

    let record = UserRecord {
        id: Uuid::new_v4(),
        email: normalize_email(&payload.email),
        role: ROLE_USER.to_string(),
        name: payload
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        password_hash,
    };

    match state.directory.create_user(record).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "account created");
            Ok((StatusCode::CREATED, Json(user.to_session_user())))
        }
        Err(e @ DirectoryError::DuplicateEmail(_)) => {
            Err((StatusCode::CONFLICT, Json(StatusResponse::failed(e.to_string()))))
        }
        Err(e) => {
            tracing::error!(error = %e, "directory write failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(StatusResponse::failed("Registration failed")),
            ))
        }
    }
}

/// logout
///
/// [Authenticated Route] Revokes the presented token.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 200, description = "Signed out", body = StatusResponse),
        (status = 401, description = "Missing, invalid or already revoked token")
    )
)]
pub async fn logout(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Json<StatusResponse> {
    state.directory.revoke_token(auth_user.jti).await;
    tracing::info!(user_id = %auth_user.id, jti = %auth_user.jti, "session revoked");
    Json(StatusResponse::ok())
}

/// get_me
///
/// [Authenticated Route] The caller's own account.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = SessionUser))
)]
pub async fn get_me(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<SessionUser>, StatusCode> {
    match state.directory.get_user(auth_user.id).await {
        Some(user) => Ok(Json(user.to_session_user())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// list_users
///
/// [Admin Route] Every account, sorted by email. Society admins and the SP role only.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "All accounts", body = [SessionUser]),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<SessionUser>>, StatusCode> {
    if !is_role_allowed(&auth_user.role, &[ROLE_ADMIN, ROLE_MASTER]) {
        return Err(StatusCode::FORBIDDEN);
    }
    let users = state.directory.list_users().await;
    Ok(Json(users.iter().map(UserRecord::to_session_user).collect()))
}
