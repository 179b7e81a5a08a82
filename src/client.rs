use crate::{
    auth_client::AuthState,
    error::LoginError,
    flows::{Credentials, LoginFlow, LogoutFlow, Navigation, Registered, RegistrationFlow},
    guard::{AccessGuard, GuardDecision, RouteTable},
    role::LandingRoutes,
    session::{SessionLookup, SessionState, lookup_session},
};

/// HubClient
///
/// Everything the view layer needs, wired around one shared Session Store:
/// the guard reads it, login writes it, logout clears it.
pub struct HubClient {
    store: SessionState,
    routes: RouteTable,
    guard: AccessGuard,
    login: LoginFlow,
    logout: LogoutFlow,
    registration: RegistrationFlow,
}

impl HubClient {
    pub fn new(
        auth: AuthState,
        store: SessionState,
        routes: RouteTable,
        landing: LandingRoutes,
    ) -> Self {
        Self {
            guard: AccessGuard::new(store.clone(), &landing),
            login: LoginFlow::new(auth.clone(), store.clone(), landing.clone()),
            logout: LogoutFlow::new(auth.clone(), store.clone(), landing.clone()),
            registration: RegistrationFlow::new(auth, landing),
            store,
            routes,
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Guard decision for navigating to `path`. Evaluated fresh every call.
    pub fn navigate(&self, path: &str) -> GuardDecision {
        self.guard.check_route(&self.routes, path)
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<Navigation, LoginError> {
        self.login.submit(credentials).await
    }

    pub async fn logout(&self) -> Navigation {
        self.logout.run().await
    }

    pub async fn register(
        &self,
        credentials: &Credentials,
        name: Option<&str>,
    ) -> Result<Registered, LoginError> {
        self.registration.submit(credentials, name).await
    }

    pub fn current_session(&self) -> SessionLookup {
        lookup_session(self.store.as_ref())
    }
}
