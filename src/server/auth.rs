use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::directory::{DirectoryState, UserRecord};
use crate::error::TokenError;

/// Claims
///
/// Payload of a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id.
    pub sub: Uuid,
    /// Role at issue time. Informational; requests re-read the role from the directory.
    pub role: String,
    /// Token id, the handle logout revokes.
    pub jti: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// TokenIssuer
///
/// Signs and verifies HS256 session tokens with the configured secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn issue(&self, user: &UserRecord) -> Result<String, TokenError> {
        let now = Utc::now().timestamp().max(0) as usize;
        let exp = usize::try_from(self.ttl_secs)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(TokenError::LifetimeOverflow(self.ttl_secs))?;
        let claims = Claims {
            sub: user.id,
            role: user.role.clone(),
            jti: Uuid::new_v4(),
            iat: now,
            exp,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        decode::<Claims>(token, &self.decoding, &validation).map(|data| data.claims)
    }
}

/// AuthUser
///
/// Resolved identity of a request carrying a valid bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    /// Current role from the directory, not the one frozen into the token.
    pub role: String,
    pub jti: Uuid,
}

/// AuthUser Extractor
///
/// Bearer token → signature/expiry check → revocation check → directory lookup.
/// Any failure rejects the request with 401.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    DirectoryState: FromRef<S>,
    TokenIssuer: FromRef<S>,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let directory = DirectoryState::from_ref(state);
        let tokens = TokenIssuer::from_ref(state);

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let claims = tokens.verify(token).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => tracing::debug!("rejected expired token"),
                other => tracing::debug!(kind = ?other, "rejected invalid token"),
            }
            StatusCode::UNAUTHORIZED
        })?;

        if directory.is_token_revoked(claims.jti).await {
            tracing::debug!(jti = %claims.jti, "rejected revoked token");
            return Err(StatusCode::UNAUTHORIZED);
        }

        // The account may have been removed after the token was issued.
        let user = directory
            .get_user(claims.sub)
            .await
            .ok_or(StatusCode::UNAUTHORIZED)?;

        Ok(AuthUser {
            id: user.id,
            role: user.role,
            jti: claims.jti,
        })
    }
}
