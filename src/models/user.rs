/*
 * Responsibility
 * - the capability set a user record needs for the guard (id / email / full name)
 * - a concrete User record for callers without their own model
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A record the guard can authenticate.
pub trait Authenticatable {
    /// Stable identifier, encoded as the token subject.
    fn auth_id(&self) -> Uuid;
    fn email(&self) -> &str;
    fn full_name(&self) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl User {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl Authenticatable for User {
    fn auth_id(&self) -> Uuid {
        self.id
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn full_name(&self) -> String {
        match (self.first_name.trim(), self.last_name.trim()) {
            ("", last) => last.to_string(),
            (first, "") => first.to_string(),
            (first, last) => format!("{first} {last}"),
        }
    }
}
