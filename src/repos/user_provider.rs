/*
 * Responsibility
 * - user directory contract consumed by the guard
 * - lookups answer "found or not"; storage failures stay inside the implementation
 */
use uuid::Uuid;

use crate::models::credentials::Credentials;
use crate::models::user::Authenticatable;

pub trait UserProvider {
    type User: Authenticatable + Clone;

    fn retrieve_by_id(&self, id: Uuid) -> Option<Self::User>;

    /// Find the candidate named by the non-password fields of `credentials`.
    fn retrieve_by_credentials(&self, credentials: &Credentials) -> Option<Self::User>;

    /// Check the plaintext secret in `credentials` against `user`.
    fn validate_credentials(&self, user: &Self::User, credentials: &Credentials) -> bool;
}
