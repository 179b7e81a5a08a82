use std::sync::Arc;
use student_hub::{
    Credentials, MemorySessionStore, MockAuthService, Navigation, SessionStore,
    auth_client::AuthState,
    error::LoginError,
    flows::{LoginFlow, LogoutFlow, RegistrationFlow, resolve_destination},
    models::{LoginResponse, SessionUser},
    role::LandingRoutes,
    session::{Session, SessionLookup, SessionState, lookup_session, save_session},
};
use tokio::sync::Notify;
use uuid::Uuid;

// --- Helpers ---

fn user_with_role(role: &str) -> SessionUser {
    SessionUser {
        id: Some(Uuid::new_v4().into()),
        email: Some("someone@hub.local".to_string()),
        role: role.to_string(),
        name: None,
    }
}

fn accepted(role: &str, redirect: Option<&str>) -> LoginResponse {
    LoginResponse::accepted(
        user_with_role(role),
        "issued-token".to_string(),
        redirect.map(str::to_string),
    )
}

fn valid_credentials() -> Credentials {
    Credentials::new("someone@hub.local", "correct horse")
}

struct Harness {
    auth: Arc<MockAuthService>,
    store: Arc<MemorySessionStore>,
}

impl Harness {
    fn new(auth: MockAuthService, store: MemorySessionStore) -> Self {
        Self {
            auth: Arc::new(auth),
            store: Arc::new(store),
        }
    }

    fn login_flow(&self) -> LoginFlow {
        LoginFlow::new(
            self.auth.clone() as AuthState,
            self.store.clone() as SessionState,
            LandingRoutes::default(),
        )
    }

    fn logout_flow(&self) -> LogoutFlow {
        LogoutFlow::new(
            self.auth.clone() as AuthState,
            self.store.clone() as SessionState,
            LandingRoutes::default(),
        )
    }
}

// --- Login: success ---

#[tokio::test]
async fn test_login_falls_back_to_role_mapping() {
    let h = Harness::new(
        MockAuthService::replying(accepted("admin", None)),
        MemorySessionStore::new(),
    );

    let navigation = h.login_flow().submit(&valid_credentials()).await.unwrap();

    assert_eq!(navigation, Navigation::to("/admin/dashboard"));
    assert_eq!(h.auth.login_calls(), 1);
    match lookup_session(h.store.as_ref()) {
        SessionLookup::Active(session) => {
            assert_eq!(session.user.role, "admin");
            assert_eq!(session.token.as_deref(), Some("issued-token"));
        }
        other => panic!("session should be written, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_uses_explicit_redirect_verbatim() {
    let h = Harness::new(
        MockAuthService::replying(accepted("admin", Some("/events?tab=Mine"))),
        MemorySessionStore::new(),
    );

    let navigation = h.login_flow().submit(&valid_credentials()).await.unwrap();

    assert_eq!(navigation.target, "/events?tab=Mine");
}

#[tokio::test]
async fn test_login_maps_master_and_unknown_roles() {
    for (role, expected) in [
        ("master", "/sp/dashboard"),
        (" Master", "/sp/dashboard"),
        ("user", "/student/dashboard"),
        ("alumni", "/student/dashboard"),
    ] {
        let h = Harness::new(
            MockAuthService::replying(accepted(role, None)),
            MemorySessionStore::new(),
        );
        let navigation = h.login_flow().submit(&valid_credentials()).await.unwrap();
        assert_eq!(navigation.target, expected, "role {role:?}");
    }
}

#[tokio::test]
async fn test_login_replaces_previous_session() {
    let old = Session::new(user_with_role("user"), Some("old-token".to_string()));
    let store = MemorySessionStore::new();
    save_session(&store, &old).unwrap();
    let h = Harness::new(MockAuthService::replying(accepted("master", None)), store);

    h.login_flow().submit(&valid_credentials()).await.unwrap();

    match lookup_session(h.store.as_ref()) {
        SessionLookup::Active(session) => assert_eq!(session.user.role, "master"),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_blank_redirect_is_ignored() {
    let landing = LandingRoutes::default();
    assert_eq!(resolve_destination(Some("  "), "admin", &landing), "/admin/dashboard");
    assert_eq!(resolve_destination(Some("/x"), "admin", &landing), "/x");
    assert_eq!(resolve_destination(None, "master", &landing), "/sp/dashboard");
}

// --- Login: failures ---

#[tokio::test]
async fn test_rejected_login_surfaces_message_and_writes_nothing() {
    let h = Harness::new(
        MockAuthService::replying(LoginResponse::rejected("Incorrect password")),
        MemorySessionStore::new(),
    );

    let err = h.login_flow().submit(&valid_credentials()).await.unwrap_err();

    match err {
        LoginError::Rejected(message) => assert_eq!(message, "Incorrect password"),
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(h.store.get().unwrap(), None);
}

#[tokio::test]
async fn test_rejection_without_message_gets_default() {
    let mut reply = LoginResponse::rejected("");
    reply.error = None;
    let h = Harness::new(MockAuthService::replying(reply), MemorySessionStore::new());

    let err = h.login_flow().submit(&valid_credentials()).await.unwrap_err();

    assert_eq!(err.to_string(), "Login failed");
}

#[tokio::test]
async fn test_unreachable_service_writes_nothing() {
    let h = Harness::new(MockAuthService::unreachable(), MemorySessionStore::new());

    let err = h.login_flow().submit(&valid_credentials()).await.unwrap_err();

    assert!(matches!(err, LoginError::Service(_)));
    assert_eq!(h.store.get().unwrap(), None);
}

#[tokio::test]
async fn test_success_without_user_is_a_service_failure() {
    let mut reply = accepted("admin", None);
    reply.user = None;
    let h = Harness::new(MockAuthService::replying(reply), MemorySessionStore::new());

    let err = h.login_flow().submit(&valid_credentials()).await.unwrap_err();

    assert!(matches!(err, LoginError::Service(_)));
    assert_eq!(h.store.get().unwrap(), None);
}

#[tokio::test]
async fn test_store_write_failure_prevents_navigation() {
    let h = Harness::new(
        MockAuthService::replying(accepted("admin", None)),
        MemorySessionStore::new_failing(),
    );

    let err = h.login_flow().submit(&valid_credentials()).await.unwrap_err();

    assert!(matches!(err, LoginError::Store(_)));
}

#[tokio::test]
async fn test_validation_failure_never_calls_service() {
    let h = Harness::new(
        MockAuthService::replying(accepted("admin", None)),
        MemorySessionStore::new(),
    );

    let err = h
        .login_flow()
        .submit(&Credentials::new("   ", ""))
        .await
        .unwrap_err();

    match err {
        LoginError::Validation(errors) => {
            assert_eq!(errors.message_for("email"), Some("Email is required"));
            assert_eq!(errors.message_for("password"), Some("Password is required"));
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(h.auth.login_calls(), 0);
}

#[test]
fn test_credential_validation_rules() {
    assert!(Credentials::new("a@b", "x").validate().is_ok());
    assert!(Credentials::new("  padded@hub.local  ", "x").validate().is_ok());

    for email in ["plainaddress", "@hub.local", "someone@", "a@b@c", "some one@hub.local"] {
        let errors = Credentials::new(email, "x").validate().unwrap_err();
        assert_eq!(
            errors.message_for("email"),
            Some("Enter a valid email address"),
            "email {email:?}"
        );
        assert_eq!(errors.message_for("password"), None);
    }
}

// --- Login: in-flight flag ---

#[tokio::test]
async fn test_second_submission_while_in_flight_is_refused() {
    let gate = Arc::new(Notify::new());
    let h = Harness::new(
        MockAuthService::replying(accepted("admin", None)).gated(gate.clone()),
        MemorySessionStore::new(),
    );
    let flow = h.login_flow();
    let credentials = valid_credentials();

    let (first, second) = tokio::join!(flow.submit(&credentials), async {
        while !flow.is_in_flight() {
            tokio::task::yield_now().await;
        }
        let second = flow.submit(&credentials).await;
        gate.notify_one();
        second
    });

    assert_eq!(first.unwrap().target, "/admin/dashboard");
    assert!(matches!(second, Err(LoginError::AlreadyInFlight)));
    assert_eq!(h.auth.login_calls(), 1);
    assert!(!flow.is_in_flight());
}

#[tokio::test]
async fn test_flag_released_after_failure() {
    let h = Harness::new(MockAuthService::unreachable(), MemorySessionStore::new());
    let flow = h.login_flow();

    assert!(flow.submit(&valid_credentials()).await.is_err());
    assert!(!flow.is_in_flight());
    assert!(matches!(
        flow.submit(&valid_credentials()).await,
        Err(LoginError::Service(_))
    ));
    assert_eq!(h.auth.login_calls(), 2);
}

// --- Logout ---

#[tokio::test]
async fn test_logout_clears_session_and_notifies_with_token() {
    let store = MemorySessionStore::new();
    save_session(
        &store,
        &Session::new(user_with_role("admin"), Some("live-token".to_string())),
    )
    .unwrap();
    let h = Harness::new(MockAuthService::default(), store);

    let navigation = h.logout_flow().run().await;

    assert_eq!(navigation, Navigation::to("/login"));
    assert_eq!(h.store.get().unwrap(), None);
    assert_eq!(h.auth.logout_calls(), 1);
    assert_eq!(h.auth.last_logout_token().as_deref(), Some("live-token"));
}

#[tokio::test]
async fn test_logout_succeeds_locally_when_server_fails() {
    let store = MemorySessionStore::new();
    save_session(&store, &Session::new(user_with_role("user"), None)).unwrap();
    let h = Harness::new(MockAuthService::default().failing_logout(), store);

    let navigation = h.logout_flow().run().await;

    assert_eq!(navigation.target, "/login");
    assert_eq!(h.store.get().unwrap(), None);
    assert_eq!(h.auth.logout_calls(), 1);
}

#[tokio::test]
async fn test_logout_with_malformed_session_still_clears() {
    let h = Harness::new(
        MockAuthService::default(),
        MemorySessionStore::with_entry("{{{"),
    );

    let navigation = h.logout_flow().run().await;

    assert_eq!(navigation.target, "/login");
    assert_eq!(h.store.get().unwrap(), None);
    assert_eq!(h.auth.last_logout_token(), None);
}

#[tokio::test]
async fn test_logout_navigates_even_if_store_cannot_clear() {
    let h = Harness::new(MockAuthService::default(), MemorySessionStore::new_failing());

    let navigation = h.logout_flow().run().await;

    assert_eq!(navigation.target, "/login");
}

// --- Registration ---

#[tokio::test]
async fn test_registration_returns_user_and_login_route() {
    let auth = Arc::new(MockAuthService::default());
    let flow = RegistrationFlow::new(auth.clone() as AuthState, LandingRoutes::default());

    let registered = flow
        .submit(&Credentials::new("new@hub.local", "pw"), Some("  New Student "))
        .await
        .unwrap();

    assert_eq!(registered.user.email.as_deref(), Some("new@hub.local"));
    assert_eq!(registered.user.role, "user");
    assert_eq!(registered.user.name.as_deref(), Some("New Student"));
    assert_eq!(registered.navigation.target, "/login");
    assert_eq!(auth.register_calls(), 1);
}

#[tokio::test]
async fn test_registration_rejection_surfaces_message() {
    let auth = Arc::new(
        MockAuthService::default().rejecting_registration("an account already exists"),
    );
    let flow = RegistrationFlow::new(auth.clone() as AuthState, LandingRoutes::default());

    let err = flow
        .submit(&Credentials::new("dup@hub.local", "pw"), None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "an account already exists");
}

#[tokio::test]
async fn test_registration_validation_skips_service() {
    let auth = Arc::new(MockAuthService::default());
    let flow = RegistrationFlow::new(auth.clone() as AuthState, LandingRoutes::default());

    assert!(matches!(
        flow.submit(&Credentials::new("nope", "pw"), None).await,
        Err(LoginError::Validation(_))
    ));
    assert_eq!(auth.register_calls(), 0);
}
