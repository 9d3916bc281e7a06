/*
 * Responsibility
 * - request-scoped authentication state: token extraction, user resolution, login
 * - codec/provider do the real work; the guard only orchestrates and memoizes
 *
 * Notes
 * - failures surface as None / false; only token issuing returns errors
 * - one Guard per request, dropped with it; nothing here is shared
 */
mod resolution;

use tracing::{debug, error};
use uuid::Uuid;

use crate::error::GuardError;
use crate::models::credentials::Credentials;
use crate::models::user::Authenticatable;
use crate::repos::user_provider::UserProvider;
use crate::request::{RequestContext, parse_bearer};
use crate::services::auth::{TokenCodec, TokenPayload};

pub use resolution::Resolution;

pub struct Guard<C, P: UserProvider, R> {
    codec: C,
    provider: P,
    request: R,
    resolution: Resolution<P::User>,
    last_attempted: Option<P::User>,
}

impl<C, P, R> Guard<C, P, R>
where
    C: TokenCodec,
    P: UserProvider,
    R: RequestContext,
{
    /// Build a guard without reading the request yet.
    pub fn new(codec: C, provider: P, request: R) -> Self {
        Self {
            codec,
            provider,
            request,
            resolution: Resolution::default(),
            last_attempted: None,
        }
    }

    /// Build a guard and hand the request's bearer token to the codec.
    pub fn for_request(codec: C, provider: P, request: R) -> Self {
        let mut guard = Self::new(codec, provider, request);
        guard.token_for_request();
        guard
    }

    /// The authenticated user, resolved at most once per guard.
    pub fn current_user(&mut self) -> Option<&P::User> {
        if !self.resolution.is_resolved() {
            let user = self.resolve_from_token();
            self.resolution = Resolution::Resolved(user);
        }
        self.resolution.user()
    }

    fn resolve_from_token(&self) -> Option<P::User> {
        if !self.codec.is_healthy() {
            debug!("no verified token on request");
            return None;
        }
        let user_id = self.codec.payload()?.user_id;

        let user = self.provider.retrieve_by_id(user_id);
        if user.is_none() {
            debug!(user_id = %user_id, "token subject not found");
        }
        user
    }

    /// The cached user, without resolving.
    pub fn cached_user(&self) -> Option<&P::User> {
        self.resolution.user()
    }

    pub fn has_user(&self) -> bool {
        self.cached_user().is_some()
    }

    pub fn check(&mut self) -> bool {
        self.current_user().is_some()
    }

    pub fn guest(&mut self) -> bool {
        !self.check()
    }

    pub fn id(&mut self) -> Option<Uuid> {
        self.current_user().map(|u| u.auth_id())
    }

    /// Like `current_user`, for handlers that must reject anonymous requests.
    pub fn authenticate(&mut self) -> Result<&P::User, GuardError> {
        self.current_user().ok_or(GuardError::Unauthenticated)
    }

    pub fn set_user(&mut self, user: P::User) -> &mut Self {
        self.resolution = Resolution::Resolved(Some(user));
        self
    }

    /// Log out for the rest of the request: no user, no token.
    pub fn forget_user(&mut self) -> &mut Self {
        self.resolution = Resolution::Resolved(None);
        self.codec.forget_token();
        self
    }

    /// The bearer token for this request.
    ///
    /// The header is only consulted while the codec holds no healthy token, so
    /// a verified token is never replaced by a later header value.
    pub fn token_for_request(&mut self) -> Option<&str> {
        if !self.codec.is_healthy() {
            if let Some(value) = self.request.authorization() {
                match parse_bearer(value) {
                    Some(token) => self.codec.set_token(token),
                    None => {
                        debug!("malformed Authorization header");
                        self.codec.forget_token();
                    }
                }
            }
        }
        self.codec.token()
    }

    /// Mint a token for the current user.
    ///
    /// Calling this before a user is set is a caller bug: `NoCurrentUser`.
    pub fn issue_token_for_user(&mut self) -> Result<String, GuardError> {
        let user = self.resolution.user().ok_or(GuardError::NoCurrentUser)?;
        let claims = TokenPayload::for_user(user);
        Ok(self.codec.new_token(user, &claims)?)
    }

    pub fn login(&mut self, user: P::User) -> Result<String, GuardError> {
        debug!(user_id = %user.auth_id(), "login");
        self.set_user(user);
        self.issue_token_for_user()
    }

    /// Log in with `credentials`. The candidate is remembered either way.
    pub fn attempt(&mut self, credentials: &Credentials) -> bool {
        let candidate = self.provider.retrieve_by_credentials(credentials);
        self.last_attempted = candidate.clone();

        match candidate {
            Some(user) if self.has_valid_credentials(Some(&user), credentials) => {
                let user_id = user.auth_id();
                // The credentials were good; a signing failure only loses the token.
                if let Err(err) = self.login(user) {
                    error!(user_id = %user_id, error = %err, "failed to issue token after login");
                }
                true
            }
            _ => {
                debug!("credential attempt rejected");
                false
            }
        }
    }

    /// Check `credentials` without logging in.
    pub fn validate(&mut self, credentials: &Credentials) -> bool {
        let candidate = self.provider.retrieve_by_credentials(credentials);
        let valid = self.has_valid_credentials(candidate.as_ref(), credentials);
        self.last_attempted = candidate;
        valid
    }

    fn has_valid_credentials(&self, user: Option<&P::User>, credentials: &Credentials) -> bool {
        user.is_some_and(|u| self.provider.validate_credentials(u, credentials))
    }

    pub fn last_attempted(&self) -> Option<&P::User> {
        self.last_attempted.as_ref()
    }

    pub fn set_request(&mut self, request: R) -> &mut Self {
        self.request = request;
        self
    }

    pub fn request(&self) -> &R {
        &self.request
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

#[cfg(test)]
mod tests;
