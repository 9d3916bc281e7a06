use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::TokenError;
use crate::models::user::Authenticatable;
use crate::services::auth::codec::{TOKEN_CONTEXT, TokenCodec, TokenPayload};
use crate::services::auth::keys::JwtKeys;

/// Wire format: registered claims plus the application payload, flattened.
#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenClaims {
    iss: String,
    aud: String,
    sub: String,
    iat: i64,
    exp: i64,
    jti: String,
    #[serde(flatten)]
    payload: TokenPayload,
}

#[derive(Debug)]
enum TokenState {
    Absent,
    Verified {
        token: String,
        payload: TokenPayload,
    },
    Rejected {
        token: String,
        reason: TokenError,
    },
}

/// Request-scoped JWT codec.
///
/// A token is verified once, when it is set; the verdict is kept until the
/// next `set_token` / `forget_token` / `new_token`.
pub struct JwtCodec {
    keys: Arc<JwtKeys>,
    state: TokenState,
}

impl std::fmt::Debug for JwtCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the raw token
        f.debug_struct("JwtCodec")
            .field("keys", &self.keys)
            .field("healthy", &self.is_healthy())
            .field("rejection", &self.rejection())
            .finish()
    }
}

impl JwtCodec {
    pub fn new(keys: Arc<JwtKeys>) -> Self {
        Self {
            keys,
            state: TokenState::Absent,
        }
    }

    /// Why the current token was refused, if it was.
    pub fn rejection(&self) -> Option<&TokenError> {
        match &self.state {
            TokenState::Rejected { reason, .. } => Some(reason),
            _ => None,
        }
    }

    fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::Missing);
        }
        let claims: AccessTokenClaims = self.keys.verify(token)?;

        if claims.payload.email.trim().is_empty() {
            return Err(TokenError::EmptyClaim("email"));
        }
        if claims.payload.context != TOKEN_CONTEXT {
            return Err(TokenError::ContextMismatch(claims.payload.context));
        }
        match Uuid::parse_str(&claims.sub) {
            Ok(sub) if sub == claims.payload.user_id => {}
            _ => return Err(TokenError::SubjectMismatch),
        }

        Ok(claims.payload)
    }
}

impl TokenCodec for JwtCodec {
    fn is_healthy(&self) -> bool {
        matches!(self.state, TokenState::Verified { .. })
    }

    fn payload(&self) -> Option<&TokenPayload> {
        match &self.state {
            TokenState::Verified { payload, .. } => Some(payload),
            _ => None,
        }
    }

    fn set_token(&mut self, token: &str) {
        self.state = match self.verify(token) {
            Ok(payload) => TokenState::Verified {
                token: token.to_string(),
                payload,
            },
            Err(reason) => {
                warn!(error = %reason, "access token verification failed");
                TokenState::Rejected {
                    token: token.to_string(),
                    reason,
                }
            }
        };
    }

    fn forget_token(&mut self) {
        self.state = TokenState::Absent;
    }

    fn token(&self) -> Option<&str> {
        match &self.state {
            TokenState::Absent => None,
            TokenState::Verified { token, .. } | TokenState::Rejected { token, .. } => Some(token),
        }
    }

    fn new_token<U: Authenticatable + ?Sized>(
        &mut self,
        user: &U,
        claims: &TokenPayload,
    ) -> Result<String, TokenError> {
        let sub = user.auth_id();
        if claims.user_id != sub {
            return Err(TokenError::SubjectMismatch);
        }

        let ttl = self.keys.ttl_seconds();
        let now = chrono::Utc::now().timestamp();
        let exp = i64::try_from(ttl)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(TokenError::TtlOutOfRange(ttl))?;

        let wire = AccessTokenClaims {
            iss: self.keys.issuer().to_string(),
            aud: self.keys.audience().to_string(),
            sub: sub.to_string(),
            iat: now,
            exp,
            jti: Uuid::new_v4().to_string(),
            payload: claims.clone(),
        };

        let token = self.keys.sign(&wire)?;
        debug!(user_id = %sub, exp, "issued access token");

        self.state = TokenState::Verified {
            token: token.clone(),
            payload: claims.clone(),
        };
        Ok(token)
    }
}
