use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::DirectoryError,
    models::SessionUser,
    role::{ROLE_ADMIN, ROLE_MASTER, ROLE_USER},
};

/// UserRecord
///
/// A stored account. Only the bcrypt hash of the password is kept.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    // Stored normalized (trimmed, lower-case).
    pub email: String,
    pub role: String,
    pub name: Option<String>,
    pub password_hash: String,
}

impl UserRecord {
    pub fn to_session_user(&self) -> SessionUser {
        SessionUser {
            id: Some(self.id.into()),
            email: Some(self.email.clone()),
            role: self.role.clone(),
            name: self.name.clone(),
        }
    }
}

/// Directory Trait
///
/// Account and token-revocation storage behind the Auth Service handlers.
/// `Send + Sync + async_trait` so it can live behind `Arc<dyn Directory>` in the
/// axum state.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Lookup by email. Callers pass the normalized email.
    async fn find_by_email(&self, email: &str) -> Option<UserRecord>;
    async fn get_user(&self, id: Uuid) -> Option<UserRecord>;
    /// Fails with `DuplicateEmail` when the email is already registered.
    async fn create_user(&self, user: UserRecord) -> Result<UserRecord, DirectoryError>;
    async fn list_users(&self) -> Vec<UserRecord>;

    // --- Token revocation ---
    async fn revoke_token(&self, jti: Uuid);
    async fn is_token_revoked(&self, jti: Uuid) -> bool;
}

/// DirectoryState
///
/// The concrete type used to share the directory across the application state.
pub type DirectoryState = Arc<dyn Directory>;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, cost)
}

/// Constant-time comparison is bcrypt's job; a malformed hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// InMemoryDirectory
///
/// The directory used by the reference server. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<Uuid, UserRecord>>,
    revoked: RwLock<HashSet<Uuid>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = UserRecord>) -> Self {
        let users = users.into_iter().map(|user| (user.id, user)).collect();
        Self {
            users: RwLock::new(users),
            revoked: RwLock::new(HashSet::new()),
        }
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let users = self.users.read().ok()?;
        users.values().find(|user| user.email == email).cloned()
    }

    async fn get_user(&self, id: Uuid) -> Option<UserRecord> {
        self.users.read().ok()?.get(&id).cloned()
    }

    async fn create_user(&self, mut user: UserRecord) -> Result<UserRecord, DirectoryError> {
        user.email = normalize_email(&user.email);

        let mut users = self.users.write().map_err(|_| DirectoryError::Poisoned)?;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(DirectoryError::DuplicateEmail(user.email));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = match self.users.read() {
            Ok(users) => users.values().cloned().collect(),
            Err(_) => return Vec::new(),
        };
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }

    async fn revoke_token(&self, jti: Uuid) {
        if let Ok(mut revoked) = self.revoked.write() {
            revoked.insert(jti);
        }
    }

    async fn is_token_revoked(&self, jti: Uuid) -> bool {
        // A poisoned set cannot vouch for any token.
        self.revoked
            .read()
            .map(|revoked| revoked.contains(&jti))
            .unwrap_or(true)
    }
}

/// Demo password shared by the seeded local accounts.
pub const DEMO_PASSWORD: &str = "password";

/// demo_accounts
///
/// One account per role, for local development: a student, a society admin
/// and the SP (master) account.
pub fn demo_accounts(cost: u32) -> Result<Vec<UserRecord>, bcrypt::BcryptError> {
    let hash = hash_password(DEMO_PASSWORD, cost)?;
    let account = |email: &str, role: &str, name: &str| UserRecord {
        id: Uuid::new_v4(),
        email: email.to_string(),
        role: role.to_string(),
        name: Some(name.to_string()),
        password_hash: hash.clone(),
    };

    Ok(vec![
        account("student@hub.local", ROLE_USER, "Demo Student"),
        account("admin@hub.local", ROLE_ADMIN, "Demo Society"),
        account("sp@hub.local", ROLE_MASTER, "Student Parliament"),
    ])
}
