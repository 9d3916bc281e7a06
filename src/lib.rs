/*
 * Responsibility
 * - crate root: module wiring and the public re-exports
 * - the guard lives in `guard`, its collaborators in `services` (token codec)
 *   and `repos` (user directory)
 */
//! Request-scoped JWT authentication guard.
//!
//! One [`Guard`] is built per inbound request. It pulls the bearer token out of
//! the `Authorization` header, lets a [`TokenCodec`] verify it, resolves the
//! subject through a [`UserProvider`] and memoizes the answer until the request
//! ends.
//!
//! ```ignore
//! let keys = Arc::new(JwtKeys::from_config(&AuthConfig::from_env()?)?);
//! let mut guard = Guard::for_request(JwtCodec::new(keys), provider, request.headers());
//! if let Some(user) = guard.current_user() {
//!     tracing::info!(user_id = %user.auth_id(), "authenticated");
//! }
//! ```

pub mod config;
pub mod error;
pub mod guard;
pub mod models;
pub mod repos;
pub mod request;
pub mod services;
pub mod telemetry;

pub use config::{AppEnv, AuthConfig, SigningKeyConfig};
pub use error::{ConfigError, GuardError, TokenError};
pub use guard::Guard;
pub use models::credentials::Credentials;
pub use models::user::{Authenticatable, User};
pub use repos::memory::InMemoryUserProvider;
pub use repos::user_provider::UserProvider;
pub use request::RequestContext;
pub use services::auth::{JwtCodec, JwtKeys, TOKEN_CONTEXT, TokenCodec, TokenPayload};
