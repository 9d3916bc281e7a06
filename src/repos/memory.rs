/*
 * Responsibility
 * - UserProvider backed by a Vec, for tests and small deployments
 * - passwords are stored hashed (see repos::password)
 */
use tracing::debug;
use uuid::Uuid;

use crate::models::credentials::Credentials;
use crate::models::user::{Authenticatable, User};
use crate::repos::error::{RepoError, RepoResult};
use crate::repos::password::{BCRYPT_COST, hash_password, verify_password};
use crate::repos::user_provider::UserProvider;

#[derive(Debug, Clone)]
struct StoredUser<U> {
    user: U,
    password_hash: String,
}

/// Lookup keys understood by `retrieve_by_credentials`: `email` (case-insensitive) and `id`.
#[derive(Debug, Clone)]
pub struct InMemoryUserProvider<U = User> {
    users: Vec<StoredUser<U>>,
    cost: u32,
}

impl<U> Default for InMemoryUserProvider<U> {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            cost: BCRYPT_COST,
        }
    }
}

impl<U: Authenticatable + Clone> InMemoryUserProvider<U> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use bcrypt `cost` for passwords inserted from now on.
    pub fn with_cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }

    /// Store `user` with a freshly hashed `password`.
    pub fn insert(&mut self, user: U, password: &str) -> RepoResult<()> {
        let password_hash = hash_password(password, self.cost)?;
        self.insert_hashed(user, password_hash)
    }

    /// Store `user` with an already hashed password.
    pub fn insert_hashed(&mut self, user: U, password_hash: impl Into<String>) -> RepoResult<()> {
        let taken = self.users.iter().any(|s| {
            s.user.auth_id() == user.auth_id() || s.user.email().eq_ignore_ascii_case(user.email())
        });
        if taken {
            return Err(RepoError::Duplicate(user.email().to_string()));
        }

        self.users.push(StoredUser {
            user,
            password_hash: password_hash.into(),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn stored(&self, id: Uuid) -> Option<&StoredUser<U>> {
        self.users.iter().find(|s| s.user.auth_id() == id)
    }
}

fn field_matches<U: Authenticatable>(user: &U, key: &str, value: &str) -> bool {
    match key {
        "email" => user.email().eq_ignore_ascii_case(value.trim()),
        "id" => Uuid::parse_str(value).is_ok_and(|id| id == user.auth_id()),
        _ => false,
    }
}

impl<U: Authenticatable + Clone> UserProvider for InMemoryUserProvider<U> {
    type User = U;

    fn retrieve_by_id(&self, id: Uuid) -> Option<U> {
        self.stored(id).map(|s| s.user.clone())
    }

    fn retrieve_by_credentials(&self, credentials: &Credentials) -> Option<U> {
        let fields: Vec<_> = credentials.lookup_fields().collect();
        if fields.is_empty() {
            debug!("credential lookup without any lookup field");
            return None;
        }

        self.users
            .iter()
            .find(|s| fields.iter().all(|(k, v)| field_matches(&s.user, k, v)))
            .map(|s| s.user.clone())
    }

    fn validate_credentials(&self, user: &U, credentials: &Credentials) -> bool {
        let Some(password) = credentials.password() else {
            return false;
        };
        self.stored(user.auth_id())
            .is_some_and(|s| verify_password(password, &s.password_hash))
    }
}
