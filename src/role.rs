//! Role normalization and the role → landing-route mapping.
//!
//! Roles are an open set of strings ("admin", "master", "user", ...). Every
//! comparison in the crate, client guard and server alike, goes through
//! `normalize_role` / `is_role_allowed` so the rules cannot drift between call sites.

use serde::{Deserialize, Serialize};

/// Role string for the super-admin ("SP") dashboard.
pub const ROLE_MASTER: &str = "master";
/// Role string for society/day-house administrators.
pub const ROLE_ADMIN: &str = "admin";
/// Role given to self-registered accounts (students).
pub const ROLE_USER: &str = "user";

/// normalize_role
///
/// Trims surrounding whitespace and lower-cases the role.
pub fn normalize_role(role: &str) -> String {
    role.trim().to_lowercase()
}

/// is_role_allowed
///
/// True when `role` equals any entry of `allowed` after both sides are normalized.
/// Exact match only: "admin" does not admit "administrator" or "adm".
/// An empty `allowed` set admits nothing here; "any session" is decided by the guard
/// before this is called.
pub fn is_role_allowed<S: AsRef<str>>(role: &str, allowed: &[S]) -> bool {
    let role = normalize_role(role);
    allowed
        .iter()
        .any(|candidate| normalize_role(candidate.as_ref()) == role)
}

/// LandingRoutes
///
/// Where each kind of user lands after login, plus the login route every
/// denied navigation redirects to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandingRoutes {
    pub login: String,
    pub master: String,
    pub admin: String,
    pub student: String,
}

impl Default for LandingRoutes {
    fn default() -> Self {
        Self {
            login: "/login".to_string(),
            master: "/sp/dashboard".to_string(),
            admin: "/admin/dashboard".to_string(),
            student: "/student/dashboard".to_string(),
        }
    }
}

impl LandingRoutes {
    /// landing_for
    ///
    /// Total mapping from any role string to a destination. Unknown, blank and
    /// student roles all fall through to the student landing page.
    pub fn landing_for(&self, role: &str) -> &str {
        match normalize_role(role).as_str() {
            ROLE_MASTER => &self.master,
            ROLE_ADMIN => &self.admin,
            _ => &self.student,
        }
    }
}
