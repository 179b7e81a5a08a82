// --- Module Structure ---

// Client side: session storage, route guarding, login/logout flows.
pub mod auth_client;
pub mod client;
pub mod flows;
pub mod guard;
pub mod role;
pub mod session;

// Shared plumbing.
pub mod config;
pub mod error;
pub mod models;

// The `hub` command-line front end.
pub mod cli;

// Reference Auth Service (axum).
pub mod server;

// --- Public Re-exports ---

pub use auth_client::{AuthService, AuthState, HttpAuthService, MockAuthService};
pub use client::HubClient;
pub use config::{AppConfig, Env};
pub use flows::{Credentials, Navigation};
pub use guard::{AccessGuard, DenyReason, GuardDecision, RouteGuardConfig, RouteTable};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionState, SessionStore};
pub use server::{AppState, create_router};
