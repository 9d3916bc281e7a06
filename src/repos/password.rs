use bcrypt::{hash, verify};

use crate::repos::error::{RepoError, RepoResult};

/// Bcrypt cost used when none is configured.
pub const BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Bcrypt only looks at the first 72 bytes; longer input is refused, not truncated.
pub const MAX_PASSWORD_LENGTH: usize = 72;

/// Hash `password` with bcrypt at `cost`. The salt is part of the returned string.
pub fn hash_password(password: &str, cost: u32) -> RepoResult<String> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(RepoError::PasswordTooLong);
    }
    hash(password, cost).map_err(|e| RepoError::Hashing(e.to_string()))
}

/// Malformed or foreign hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if password.len() > MAX_PASSWORD_LENGTH {
        return false;
    }
    verify(password, stored).unwrap_or(false)
}
