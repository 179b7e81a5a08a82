use std::fmt;

use thiserror::Error;

/// StoreError
///
/// Failures raised by a `SessionStore` backend. The in-memory store never
/// produces one; the file store surfaces I/O problems through `Io` and
/// entries that are present but not text through `Undecodable`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("session store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored session is not valid UTF-8: {0}")]
    Undecodable(#[from] std::string::FromUtf8Error),

    #[error("session store lock poisoned")]
    Poisoned,

    #[error("session could not be serialized: {0}")]
    Encode(#[from] serde_json::Error),
}

/// TokenError
///
/// Failures while signing a session token.
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("token lifetime of {0}s overflows the expiry timestamp")]
    LifetimeOverflow(u64),

    #[error("token signing failed: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// AuthServiceError
///
/// Network or server failures while talking to the Auth Service.
/// A well-formed `{success:false}` reply is NOT one of these; it is a rejection
/// and is reported through `LoginError::Rejected`.
#[derive(Error, Debug)]
pub enum AuthServiceError {
    #[error("auth service unreachable: {0}")]
    Transport(String),

    #[error("auth service returned HTTP {0}")]
    Status(u16),

    #[error("auth service sent an unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for AuthServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AuthServiceError::InvalidResponse(err.to_string())
        } else {
            AuthServiceError::Transport(err.to_string())
        }
    }
}

/// A single client-side validation problem, attached to the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// ValidationErrors
///
/// Every field problem found in one submission. Reported before any network call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Message for `field`, if that field failed.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// LoginError
///
/// Everything that can stop a login (or registration) submission from
/// producing a navigation. None of these write a session.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("a login request is already in progress")]
    AlreadyInFlight,

    /// The Auth Service answered and refused the credentials. The message is
    /// the service's own text, shown to the user verbatim.
    #[error("{0}")]
    Rejected(String),

    #[error(transparent)]
    Service(#[from] AuthServiceError),

    #[error("could not save session: {0}")]
    Store(#[from] StoreError),
}

/// DirectoryError
///
/// Failures from the reference Auth Service's user directory.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("an account already exists for {0}")]
    DuplicateEmail(String),

    #[error("user directory lock poisoned")]
    Poisoned,
}
