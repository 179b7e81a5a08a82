use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::{
    error::AuthServiceError,
    models::{LoginRequest, LoginResponse, RegisterRequest, SessionUser, StatusResponse},
    role::ROLE_USER,
};

/// RegisterReply
///
/// Outcome of a registration call the service actually answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterReply {
    Created(SessionUser),
    Rejected(String),
}

// 1. AuthService Contract
/// AuthService
///
/// The client's view of the server that verifies credentials. Swapping the HTTP
/// implementation for `MockAuthService` lets the login/logout flows run without a
/// network.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchanges credentials for a `LoginResponse`. A refusal
    /// (`success: false`) is an `Ok`; only transport and protocol problems are `Err`.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthServiceError>;

    /// Tells the service the session is over. Callers treat this as best-effort.
    async fn logout(&self, token: Option<&str>) -> Result<(), AuthServiceError>;

    async fn register(&self, request: &RegisterRequest)
    -> Result<RegisterReply, AuthServiceError>;
}

/// AuthState
///
/// Shared handle to whichever Auth Service implementation is in use.
pub type AuthState = Arc<dyn AuthService>;

// 2. The Real Implementation (HTTP)
/// HttpAuthService
///
/// Talks to the Auth Service over HTTP/JSON with `reqwest`.
#[derive(Clone)]
pub struct HttpAuthService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAuthService {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AuthServiceError> {
        let response = self.client.post(self.url("/login")).json(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        // Refusals come back as 4xx with the same body shape, so the body is
        // parsed regardless of status.
        match serde_json::from_slice::<LoginResponse>(&body) {
            Ok(parsed) => Ok(parsed),
            Err(_) if !status.is_success() => Err(AuthServiceError::Status(status.as_u16())),
            Err(e) => Err(AuthServiceError::InvalidResponse(e.to_string())),
        }
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), AuthServiceError> {
        let mut request = self.client.post(self.url("/logout"));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AuthServiceError::Status(response.status().as_u16()))
        }
    }

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterReply, AuthServiceError> {
        let response = self
            .client
            .post(self.url("/register"))
            .json(request)
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::CREATED || status == StatusCode::OK {
            let user = response.json::<SessionUser>().await?;
            return Ok(RegisterReply::Created(user));
        }

        let body = response.bytes().await?;
        match serde_json::from_slice::<StatusResponse>(&body) {
            Ok(StatusResponse { error, .. }) => Ok(RegisterReply::Rejected(
                error.unwrap_or_else(|| "Registration failed".to_string()),
            )),
            Err(_) => Err(AuthServiceError::Status(status.as_u16())),
        }
    }
}

// 3. The Mock Implementation (For Tests)
/// MockAuthService
///
/// Canned Auth Service. Counts calls so tests can assert "exactly once" and
/// "never", and can hold a login open on a `Notify` to exercise the in-flight flag.
#[derive(Default)]
pub struct MockAuthService {
    /// `None` simulates an unreachable service.
    login_reply: Option<LoginResponse>,
    register_rejection: Option<String>,
    fail_logout: bool,
    gate: Option<Arc<Notify>>,
    login_calls: AtomicUsize,
    logout_calls: AtomicUsize,
    register_calls: AtomicUsize,
    last_logout_token: Mutex<Option<String>>,
}

impl MockAuthService {
    pub fn replying(reply: LoginResponse) -> Self {
        Self {
            login_reply: Some(reply),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            fail_logout: true,
            ..Self::default()
        }
    }

    /// Logout calls fail with a 500.
    pub fn failing_logout(mut self) -> Self {
        self.fail_logout = true;
        self
    }

    pub fn rejecting_registration(mut self, message: impl Into<String>) -> Self {
        self.register_rejection = Some(message.into());
        self
    }

    /// Every login waits for `gate` to be notified before answering.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn logout_calls(&self) -> usize {
        self.logout_calls.load(Ordering::SeqCst)
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn last_logout_token(&self) -> Option<String> {
        self.last_logout_token
            .lock()
            .ok()
            .and_then(|token| token.clone())
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn login(&self, _request: &LoginRequest) -> Result<LoginResponse, AuthServiceError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.login_reply
            .clone()
            .ok_or_else(|| AuthServiceError::Transport("mock: connection refused".to_string()))
    }

    async fn logout(&self, token: Option<&str>) -> Result<(), AuthServiceError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_logout_token.lock() {
            *last = token.map(str::to_string);
        }

        if self.fail_logout {
            return Err(AuthServiceError::Status(500));
        }
        Ok(())
    }

    async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterReply, AuthServiceError> {
        self.register_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.register_rejection {
            return Ok(RegisterReply::Rejected(message.clone()));
        }

        Ok(RegisterReply::Created(SessionUser {
            id: Some(Uuid::new_v4().into()),
            email: Some(request.email.clone()),
            role: ROLE_USER.to_string(),
            name: request.name.clone(),
        }))
    }
}
