/*
 * Responsibility
 * - failures the user directory reports to its owner (never to the guard)
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("password exceeds 72 bytes")]
    PasswordTooLong,

    #[error("user already exists: {0}")]
    Duplicate(String),
}

pub type RepoResult<T> = Result<T, RepoError>;
