use std::collections::BTreeMap;

use crate::{
    role::{LandingRoutes, ROLE_ADMIN, ROLE_MASTER, is_role_allowed},
    session::{SessionLookup, SessionState, lookup_session},
};

/// RouteGuardConfig
///
/// Roles admitted to one protected route. Empty means any authenticated session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGuardConfig {
    pub allowed_roles: Vec<String>,
}

impl RouteGuardConfig {
    pub fn any_session() -> Self {
        Self::default()
    }

    pub fn roles<S: Into<String>>(roles: impl IntoIterator<Item = S>) -> Self {
        Self {
            allowed_roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// RouteTable
///
/// Static map of protected route paths. Paths that are not listed are public.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: BTreeMap<String, RouteGuardConfig>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn protect(mut self, path: impl Into<String>, config: RouteGuardConfig) -> Self {
        self.routes.insert(path.into(), config);
        self
    }

    pub fn get(&self, path: &str) -> Option<&RouteGuardConfig> {
        self.routes.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RouteGuardConfig)> {
        self.routes.iter().map(|(path, config)| (path.as_str(), config))
    }

    /// student_hub
    ///
    /// The application's route table: student pages open to any session,
    /// society pages for admins, SP pages for the master role.
    pub fn student_hub() -> Self {
        Self::new()
            .protect("/student/dashboard", RouteGuardConfig::any_session())
            .protect("/events", RouteGuardConfig::any_session())
            .protect("/events/new", RouteGuardConfig::roles([ROLE_ADMIN, ROLE_MASTER]))
            .protect("/admin/dashboard", RouteGuardConfig::roles([ROLE_ADMIN]))
            .protect("/society/profile", RouteGuardConfig::roles([ROLE_ADMIN]))
            .protect("/sp/dashboard", RouteGuardConfig::roles([ROLE_MASTER]))
            .protect("/sp/societies", RouteGuardConfig::roles([ROLE_MASTER]))
    }
}

/// Why a navigation was refused. Every reason redirects to login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NoSession,
    MalformedSession,
    RoleNotAllowed,
}

/// GuardDecision
///
/// The one result the routing layer consumes for every protected navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Deny { target: String, reason: DenyReason },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    /// Redirect target for a denial, `None` when allowed.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::Deny { target, .. } => Some(target),
        }
    }
}

/// AccessGuard
///
/// Decides per navigation whether the current session may view a route.
/// Holds no state of its own beyond the injected store and the login route;
/// every call re-reads the store.
#[derive(Clone)]
pub struct AccessGuard {
    store: SessionState,
    login_route: String,
}

impl AccessGuard {
    pub fn new(store: SessionState, landing: &LandingRoutes) -> Self {
        Self {
            store,
            login_route: landing.login.clone(),
        }
    }

    /// evaluate
    ///
    /// Decision for a route admitting `allowed_roles`. Reads the store and
    /// nothing else.
    pub fn evaluate<S: AsRef<str>>(&self, allowed_roles: &[S]) -> GuardDecision {
        let session = match lookup_session(self.store.as_ref()) {
            SessionLookup::Active(session) => session,
            SessionLookup::Missing => return self.deny(DenyReason::NoSession),
            SessionLookup::Malformed => return self.deny(DenyReason::MalformedSession),
        };

        let session_role = &session.user.role;
        let allowed: Vec<&str> = allowed_roles.iter().map(AsRef::as_ref).collect();

        if allowed.is_empty() || is_role_allowed(session_role, &allowed) {
            tracing::debug!(role = %session_role, allowed = ?allowed, "access granted");
            GuardDecision::Allow
        } else {
            tracing::debug!(role = %session_role, allowed = ?allowed, "access denied: role not allowed");
            self.deny(DenyReason::RoleNotAllowed)
        }
    }

    /// check_route
    ///
    /// Looks `path` up in `routes`. Unlisted paths are public and admitted
    /// without touching the store.
    pub fn check_route(&self, routes: &RouteTable, path: &str) -> GuardDecision {
        match routes.get(path) {
            Some(config) => self.evaluate(&config.allowed_roles),
            None => {
                tracing::trace!(path, "public route");
                GuardDecision::Allow
            }
        }
    }

    fn deny(&self, reason: DenyReason) -> GuardDecision {
        if reason != DenyReason::RoleNotAllowed {
            tracing::debug!(?reason, "access denied");
        }
        GuardDecision::Deny {
            target: self.login_route.clone(),
            reason,
        }
    }
}
