use std::env;

use crate::role::LandingRoutes;

const LOCAL_JWT_SECRET: &str = "student-hub-local-development-secret";

// Thirty days.
pub const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 60 * 60;

// Work factors bcrypt will hash with.
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// AppConfig
///
/// Configuration of the reference Auth Service. Loaded once at startup and
/// treated as immutable afterwards. The `hub` client takes its settings from
/// command-line flags instead.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format, demo seeding, secret fallback.
    pub env: Env,
    // Address the Auth Service listens on.
    pub bind_addr: String,
    // HS256 secret used to sign and verify session tokens.
    pub jwt_secret: String,
    // Token lifetime, in seconds.
    pub token_ttl_secs: u64,
    // bcrypt work factor for stored passwords.
    pub bcrypt_cost: u32,
    pub landing: LandingRoutes,
}

/// Env
///
/// Runtime context: local development or production.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe values for tests; nothing is read from the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: "127.0.0.1:3000".to_string(),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            token_ttl_secs: 3600,
            // Minimum cost bcrypt accepts; keeps test hashing fast.
            bcrypt_cost: 4,
            landing: LandingRoutes::default(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads configuration from environment variables.
    ///
    /// # Panics
    /// Panics in production when `HUB_JWT_SECRET` is missing, when
    /// `HUB_TOKEN_TTL_SECS` is set but not an integer in
    /// `1..=MAX_TOKEN_TTL_SECS`, or when `HUB_BCRYPT_COST` is set but not an
    /// integer bcrypt accepts (4 to 31).
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").unwrap_or_default().as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => env::var("HUB_JWT_SECRET")
                .expect("FATAL: HUB_JWT_SECRET must be set in production."),
            Env::Local => {
                env::var("HUB_JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string())
            }
        };

        let token_ttl_secs = match env::var("HUB_TOKEN_TTL_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|ttl| (1..=MAX_TOKEN_TTL_SECS).contains(ttl))
                .expect("FATAL: HUB_TOKEN_TTL_SECS must be an integer between 1 and 2592000."),
            Err(_) => 3600,
        };

        let bcrypt_cost = match env::var("HUB_BCRYPT_COST") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|cost| BCRYPT_COST_RANGE.contains(cost))
                .expect("FATAL: HUB_BCRYPT_COST must be an integer between 4 and 31."),
            Err(_) => bcrypt::DEFAULT_COST,
        };

        Self {
            env,
            bind_addr: env::var("HUB_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            jwt_secret,
            token_ttl_secs,
            bcrypt_cost,
            landing: LandingRoutes::default(),
        }
    }
}
