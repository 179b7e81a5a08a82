//! `hub`: command-line front end to the Student Hub.
//!
//! Each invocation is one "navigation" in browser terms; the session file plays
//! the part of local storage between invocations.

use std::{fmt::Write as _, path::PathBuf};

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use crate::{
    client::HubClient,
    error::LoginError,
    flows::Credentials,
    guard::{DenyReason, GuardDecision},
    session::SessionLookup,
};

#[derive(Parser, Debug)]
#[command(name = "hub")]
#[command(about = "Sign in to the Student Hub and open role-protected pages", long_about = None)]
pub struct Cli {
    /// Base URL of the Auth Service
    #[arg(long, env = "HUB_AUTH_URL", global = true, default_value = "http://localhost:3000")]
    pub auth_url: String,

    /// File holding the saved session
    #[arg(
        long,
        env = "HUB_SESSION_FILE",
        global = true,
        default_value = ".student-hub/session.json"
    )]
    pub session_file: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Sign in and go to your dashboard
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "HUB_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create a student account
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "HUB_PASSWORD", hide_env_values = true)]
        password: String,

        /// Display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Sign out (always clears the local session)
    Logout,

    /// Show who is signed in
    Whoami,

    /// Open a page, subject to its role requirements
    Open {
        /// Route path, e.g. /admin/dashboard
        route: String,
    },

    /// List protected routes and the roles they admit
    Routes,
}

/// execute
///
/// Runs one command against `hub` and returns the text to print. Login and
/// registration failures come back as `Err` so the binary exits non-zero.
pub async fn execute(command: &Commands, hub: &HubClient) -> Result<String> {
    match command {
        Commands::Login { email, password } => {
            let navigation = hub
                .login(&Credentials::new(email.as_str(), password.as_str()))
                .await
                .map_err(describe_login_error)?;
            Ok(format!("Signed in. Redirecting to {}", navigation.target))
        }
        Commands::Register {
            email,
            password,
            name,
        } => {
            let registered = hub
                .register(&Credentials::new(email.as_str(), password.as_str()), name.as_deref())
                .await
                .map_err(describe_login_error)?;
            Ok(format!(
                "Registered {}. Sign in at {}",
                registered.user.email.as_deref().unwrap_or(email.as_str()),
                registered.navigation.target
            ))
        }
        Commands::Logout => {
            let navigation = hub.logout().await;
            Ok(format!("Signed out. Redirecting to {}", navigation.target))
        }
        Commands::Whoami => Ok(match hub.current_session() {
            SessionLookup::Active(session) => {
                format!("{} ({})", session.user.label(), session.user.role)
            }
            SessionLookup::Missing => "Not signed in".to_string(),
            SessionLookup::Malformed => "Saved session is unreadable; sign in again".to_string(),
        }),
        Commands::Open { route } => Ok(match hub.navigate(route) {
            GuardDecision::Allow => format!("Rendering {}", route),
            GuardDecision::Deny { target, reason } => format!(
                "Access to {} denied ({}). Redirecting to {}",
                route,
                describe_denial(reason),
                target
            ),
        }),
        Commands::Routes => {
            let mut listing = String::new();
            for (path, config) in hub.routes().iter() {
                let roles = if config.allowed_roles.is_empty() {
                    "any signed-in user".to_string()
                } else {
                    config.allowed_roles.join(", ")
                };
                let _ = writeln!(listing, "{:<20} {}", path, roles);
            }
            Ok(listing.trim_end().to_string())
        }
    }
}

fn describe_denial(reason: DenyReason) -> &'static str {
    match reason {
        DenyReason::NoSession => "not signed in",
        DenyReason::MalformedSession => "saved session is unreadable",
        DenyReason::RoleNotAllowed => "your role cannot view this page",
    }
}

fn describe_login_error(err: LoginError) -> anyhow::Error {
    match err {
        LoginError::Validation(errors) => {
            let lines = errors
                .fields
                .iter()
                .map(|field| format!("  {}: {}", field.field, field.message))
                .collect::<Vec<_>>()
                .join("\n");
            anyhow!("Please fix the following:\n{}", lines)
        }
        other => anyhow!(other),
    }
}
