//! Login, logout and registration flows.
//!
//! Each flow owns handles to the Auth Service and (where it needs one) the
//! Session Store, and ends in a `Navigation` the caller acts on.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::{
    auth_client::{AuthState, RegisterReply},
    error::{AuthServiceError, LoginError, ValidationErrors},
    models::{LoginRequest, LoginResponse, RegisterRequest, SessionUser},
    role::LandingRoutes,
    session::{Session, SessionLookup, SessionState, lookup_session, save_session},
};

/// Where the client should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub target: String,
}

impl Navigation {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

/// Credentials
///
/// What the user typed into the login (or registration) form.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// validate
    ///
    /// Per-field checks run before any request is sent. Collects every problem
    /// rather than stopping at the first.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let email = self.email.trim();
        if email.is_empty() {
            errors.push("email", "Email is required");
        } else if !looks_like_email(email) {
            errors.push("email", "Enter a valid email address");
        }

        if self.password.is_empty() {
            errors.push("password", "Password is required");
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// resolve_destination
///
/// An explicit, non-blank redirect from the service is used verbatim; otherwise
/// the role decides via `LandingRoutes::landing_for`.
pub fn resolve_destination(redirect: Option<&str>, role: &str, landing: &LandingRoutes) -> String {
    match redirect {
        Some(target) if !target.trim().is_empty() => target.to_string(),
        _ => landing.landing_for(role).to_string(),
    }
}

/// Holds the in-flight flag for the duration of one submission.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// LoginFlow
///
/// Exchanges credentials for a session. One submission at a time: a second
/// `submit` while the first is awaiting the service returns `AlreadyInFlight`
/// without calling the service.
pub struct LoginFlow {
    auth: AuthState,
    store: SessionState,
    landing: LandingRoutes,
    in_flight: AtomicBool,
}

impl LoginFlow {
    pub fn new(auth: AuthState, store: SessionState, landing: LandingRoutes) -> Self {
        Self {
            auth,
            store,
            landing,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// submit
    ///
    /// On success the session is written to the store before the navigation is
    /// returned. On any failure nothing is written.
    pub async fn submit(&self, credentials: &Credentials) -> Result<Navigation, LoginError> {
        credentials.validate()?;

        let _flight = InFlight::acquire(&self.in_flight).ok_or(LoginError::AlreadyInFlight)?;

        let request = LoginRequest {
            email: credentials.email.trim().to_string(),
            password: credentials.password.clone(),
        };

        let reply = self.auth.login(&request).await.inspect_err(|e| {
            tracing::warn!(email = %request.email, error = %e, "login request failed");
        })?;

        let LoginResponse {
            success,
            user,
            token,
            redirect,
            error,
        } = reply;

        if !success {
            let message = error
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "Login failed".to_string());
            tracing::info!(email = %request.email, reason = %message, "login rejected");
            return Err(LoginError::Rejected(message));
        }

        let user = user.ok_or_else(|| {
            AuthServiceError::InvalidResponse("successful login without a user".to_string())
        })?;

        let target = resolve_destination(redirect.as_deref(), &user.role, &self.landing);
        let session = Session::new(user, token);
        save_session(self.store.as_ref(), &session)?;

        tracing::info!(
            user_id = ?session.user.id,
            role = %session.user.role,
            target = %target,
            "login succeeded"
        );
        Ok(Navigation { target })
    }
}

/// LogoutFlow
///
/// Clears the local session no matter what, then tells the service.
pub struct LogoutFlow {
    auth: AuthState,
    store: SessionState,
    landing: LandingRoutes,
}

impl LogoutFlow {
    pub fn new(auth: AuthState, store: SessionState, landing: LandingRoutes) -> Self {
        Self {
            auth,
            store,
            landing,
        }
    }

    /// run
    ///
    /// Always ends at the login route. Neither a store failure nor a failed
    /// server notification is reported to the caller; both are logged.
    pub async fn run(&self) -> Navigation {
        let token = match lookup_session(self.store.as_ref()) {
            SessionLookup::Active(session) => session.token,
            SessionLookup::Missing | SessionLookup::Malformed => None,
        };

        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "failed to clear stored session");
        }

        if let Err(e) = self.auth.logout(token.as_deref()).await {
            tracing::warn!(error = %e, "logout notification failed; local session already cleared");
        }

        Navigation::to(self.landing.login.clone())
    }
}

/// Registered
///
/// A newly created account and where to go next (the login page).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub user: SessionUser,
    pub navigation: Navigation,
}

/// RegistrationFlow
///
/// Creates an account. Does not sign the user in.
pub struct RegistrationFlow {
    auth: AuthState,
    landing: LandingRoutes,
}

impl RegistrationFlow {
    pub fn new(auth: AuthState, landing: LandingRoutes) -> Self {
        Self { auth, landing }
    }

    pub async fn submit(
        &self,
        credentials: &Credentials,
        name: Option<&str>,
    ) -> Result<Registered, LoginError> {
        credentials.validate()?;

        let request = RegisterRequest {
            email: credentials.email.trim().to_string(),
            password: credentials.password.clone(),
            name: name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        };

        match self.auth.register(&request).await? {
            RegisterReply::Created(user) => {
                tracing::info!(user_id = ?user.id, "account registered");
                Ok(Registered {
                    user,
                    navigation: Navigation::to(self.landing.login.clone()),
                })
            }
            RegisterReply::Rejected(message) => Err(LoginError::Rejected(message)),
        }
    }
}
