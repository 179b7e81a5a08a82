use std::sync::Arc;
use student_hub::{
    AccessGuard, DenyReason, GuardDecision, MemorySessionStore, RouteTable, Session,
    SessionState, SessionStore, models::SessionUser, role::LandingRoutes,
};
use uuid::Uuid;

// --- Helpers ---

fn session_entry(role: &str) -> String {
    let user = SessionUser {
        id: Some(Uuid::new_v4().into()),
        email: Some("someone@hub.local".to_string()),
        role: role.to_string(),
        name: None,
    };
    Session::new(user, Some("token".to_string()))
        .to_entry()
        .unwrap()
}

fn guard_over(store: MemorySessionStore) -> (AccessGuard, Arc<MemorySessionStore>) {
    let store = Arc::new(store);
    let guard = AccessGuard::new(store.clone() as SessionState, &LandingRoutes::default());
    (guard, store)
}

fn guard_with_role(role: &str) -> AccessGuard {
    guard_over(MemorySessionStore::with_entry(session_entry(role))).0
}

fn denied(reason: DenyReason) -> GuardDecision {
    GuardDecision::Deny {
        target: "/login".to_string(),
        reason,
    }
}

const NO_ROLES: [&str; 0] = [];

// --- Any-session routes ---

#[test]
fn test_empty_allowed_roles_admit_any_session() {
    for role in ["user", "admin", "master", "", "society-treasurer"] {
        let guard = guard_with_role(role);
        assert_eq!(guard.evaluate(&NO_ROLES), GuardDecision::Allow, "role {role:?}");
    }
}

// --- Role matching ---

#[test]
fn test_role_match_ignores_case_and_whitespace() {
    let guard = guard_with_role(" Admin ");
    assert_eq!(guard.evaluate(&["admin"]), GuardDecision::Allow);

    let guard = guard_with_role("admin");
    assert_eq!(guard.evaluate(&["  ADMIN\t"]), GuardDecision::Allow);
}

#[test]
fn test_any_allowed_role_is_enough() {
    let guard = guard_with_role("MASTER");
    assert_eq!(guard.evaluate(&["admin", "master"]), GuardDecision::Allow);
}

#[test]
fn test_role_not_in_allowed_set_is_denied() {
    let guard = guard_with_role("user");
    assert_eq!(
        guard.evaluate(&["admin", "master"]),
        denied(DenyReason::RoleNotAllowed)
    );
}

#[test]
fn test_no_prefix_or_substring_matching() {
    assert_eq!(
        guard_with_role("administrator").evaluate(&["admin"]),
        denied(DenyReason::RoleNotAllowed)
    );
    assert_eq!(
        guard_with_role("adm").evaluate(&["admin"]),
        denied(DenyReason::RoleNotAllowed)
    );
}

// --- Missing and malformed sessions ---

#[test]
fn test_absent_session_denied_for_every_route() {
    let (guard, _) = guard_over(MemorySessionStore::new());

    assert_eq!(guard.evaluate(&NO_ROLES), denied(DenyReason::NoSession));
    assert_eq!(guard.evaluate(&["admin"]), denied(DenyReason::NoSession));
    assert_eq!(guard.evaluate(&["user", "master"]), denied(DenyReason::NoSession));
}

#[test]
fn test_malformed_session_denied_like_absent() {
    for raw in [
        "not json at all",
        "{\"user\":",
        "{}",
        "{\"user\":{\"id\":7}}",
        "{\"user\":{\"id\":7,\"role\":42}}",
        "null",
    ] {
        let (guard, _) = guard_over(MemorySessionStore::with_entry(raw));
        let decision = guard.evaluate(&NO_ROLES);
        assert_eq!(decision.redirect_target(), Some("/login"), "entry {raw:?}");
        assert_eq!(decision, denied(DenyReason::MalformedSession), "entry {raw:?}");
    }
}

#[test]
fn test_minimal_stored_identity_is_admitted() {
    for raw in [
        r#"{"user":{"id":7,"role":"admin"}}"#,
        r#"{"user":{"id":"abc","role":"admin"}}"#,
        r#"{"user":{"role":"admin"},"token":null}"#,
    ] {
        let (guard, _) = guard_over(MemorySessionStore::with_entry(raw));
        assert_eq!(guard.evaluate(&["admin"]), GuardDecision::Allow, "entry {raw:?}");
        assert_eq!(
            guard.evaluate(&["master"]),
            denied(DenyReason::RoleNotAllowed),
            "entry {raw:?}"
        );
    }
}

// --- Re-evaluation ---

#[test]
fn test_decision_follows_store_changes() {
    let (guard, store) = guard_over(MemorySessionStore::new());
    assert!(!guard.evaluate(&["admin"]).is_allowed());

    store.set(&session_entry("admin")).unwrap();
    assert!(guard.evaluate(&["admin"]).is_allowed());

    store.clear().unwrap();
    assert_eq!(guard.evaluate(&["admin"]), denied(DenyReason::NoSession));
}

// --- Route table ---

#[test]
fn test_route_table_gates_by_role() {
    let routes = RouteTable::student_hub();
    let admin = guard_with_role("admin");
    let master = guard_with_role("master");
    let student = guard_with_role("user");

    assert!(admin.check_route(&routes, "/admin/dashboard").is_allowed());
    assert!(!admin.check_route(&routes, "/sp/dashboard").is_allowed());

    assert!(master.check_route(&routes, "/sp/societies").is_allowed());
    assert!(master.check_route(&routes, "/events/new").is_allowed());

    assert!(student.check_route(&routes, "/student/dashboard").is_allowed());
    assert!(student.check_route(&routes, "/events").is_allowed());
    assert_eq!(
        student.check_route(&routes, "/events/new"),
        denied(DenyReason::RoleNotAllowed)
    );
}

#[test]
fn test_unlisted_routes_are_public() {
    let routes = RouteTable::student_hub();
    let (guard, _) = guard_over(MemorySessionStore::with_entry("garbage"));

    assert_eq!(guard.check_route(&routes, "/login"), GuardDecision::Allow);
    assert_eq!(guard.check_route(&routes, "/register"), GuardDecision::Allow);
}

#[test]
fn test_custom_login_route_is_redirect_target() {
    let landing = LandingRoutes {
        login: "/auth/sign-in".to_string(),
        ..LandingRoutes::default()
    };
    let guard = AccessGuard::new(Arc::new(MemorySessionStore::new()), &landing);

    assert_eq!(guard.evaluate(&NO_ROLES).redirect_target(), Some("/auth/sign-in"));
}
