//! The Auth Service's routes, split by who may call them.

/// Routes open to anonymous callers: health, login, registration.
pub mod public;

/// Routes behind the bearer-token middleware.
pub mod authenticated;

/// Routes for the 'admin' and 'master' roles. The role check happens in the
/// handlers, after the `AuthUser` extractor has authenticated the caller.
pub mod admin;
