use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Identity ---

/// UserId
///
/// Account identifier as the Auth Service issues it. Services differ (UUIDs,
/// database integers, opaque strings), so the client never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum UserId {
    Number(i64),
    Text(String),
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserId::Number(n) => write!(f, "{}", n),
            UserId::Text(s) => f.write_str(s),
        }
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        UserId::Text(id.to_string())
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Number(id)
    }
}

/// SessionUser
///
/// The identity the Auth Service hands back on login and the client keeps in its
/// Session Store. Only `role` is required; `role` is the raw string as issued,
/// compare it only through `role::is_role_allowed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionUser {
    #[serde(default)]
    pub id: Option<UserId>,
    #[serde(default)]
    pub email: Option<String>,
    // 'user' (students), 'admin' (societies / day-houses) or 'master' (SP).
    pub role: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl SessionUser {
    /// Human-readable handle: email, then id, then the role alone.
    pub fn label(&self) -> String {
        match (&self.email, &self.id) {
            (Some(email), _) => email.clone(),
            (None, Some(id)) => format!("user {}", id),
            (None, None) => "signed-in user".to_string(),
        }
    }
}

// --- Request Payloads ---

/// LoginRequest
///
/// Credential pair for POST /login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "student@hub.local")]
    pub email: String,
    #[schema(example = "password")]
    pub password: String,
}

/// RegisterRequest
///
/// Input for POST /register. Self-registration always yields a 'user' account;
/// there is no role field to ask for more.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

// --- Responses ---

/// LoginResponse
///
/// The single Auth Service contract for login. The same shape is used for
/// success (`success: true`, `user`, `token`, optional `redirect`) and for
/// refusal (`success: false`, `error`), whatever the HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub success: bool,
    pub user: Option<SessionUser>,
    pub token: Option<String>,
    /// Explicit post-login destination. When present it wins over the role mapping.
    pub redirect: Option<String>,
    pub error: Option<String>,
}

impl LoginResponse {
    pub fn accepted(user: SessionUser, token: String, redirect: Option<String>) -> Self {
        Self {
            success: true,
            user: Some(user),
            token: Some(token),
            redirect,
            error: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            user: None,
            token: None,
            redirect: None,
            error: Some(message.into()),
        }
    }
}

/// StatusResponse
///
/// Minimal acknowledgement body used by /logout and by refusals of /register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct StatusResponse {
    pub success: bool,
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}
