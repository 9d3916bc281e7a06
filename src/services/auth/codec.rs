use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TokenError;
use crate::models::user::Authenticatable;

/// Context tag stamped into every token this application issues.
pub const TOKEN_CONTEXT: &str = "market";

/// Application claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub context: String,
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

impl TokenPayload {
    pub fn for_user<U: Authenticatable + ?Sized>(user: &U) -> Self {
        Self {
            context: TOKEN_CONTEXT.to_string(),
            user_id: user.auth_id(),
            email: user.email().to_string(),
            name: user.full_name(),
        }
    }
}

/// Holds at most one token and knows whether it verified.
///
/// Verification cost belongs to the implementation; `is_healthy` and `payload`
/// are expected to be cheap reads of a verdict taken when the token was set.
pub trait TokenCodec {
    /// A token is present and passed verification.
    fn is_healthy(&self) -> bool;

    /// Decoded claims of a healthy token.
    fn payload(&self) -> Option<&TokenPayload>;

    fn set_token(&mut self, token: &str);

    fn forget_token(&mut self);

    /// The raw token last set or minted, healthy or not.
    fn token(&self) -> Option<&str>;

    /// Sign a new token for `user` carrying `claims`.
    fn new_token<U: Authenticatable + ?Sized>(
        &mut self,
        user: &U,
        claims: &TokenPayload,
    ) -> Result<String, TokenError>;
}
