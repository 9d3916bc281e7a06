use std::cell::Cell;
use std::collections::HashMap;

use axum::http::{HeaderMap, HeaderValue, header};
use uuid::Uuid;

use super::*;
use crate::error::TokenError;
use crate::models::user::User;

/// Codec double: tokens listed in `valid` are healthy, everything else is not.
#[derive(Default)]
struct MockCodec {
    valid: HashMap<String, TokenPayload>,
    token: Option<String>,
    fail_signing: bool,
    minted: Vec<TokenPayload>,
    health_calls: Cell<usize>,
    payload_calls: Cell<usize>,
    set_calls: usize,
}

impl MockCodec {
    fn accepting(token: &str, user: &User) -> Self {
        let mut codec = Self::default();
        codec
            .valid
            .insert(token.to_string(), TokenPayload::for_user(user));
        codec
    }

    fn lookups(&self) -> usize {
        self.health_calls.get() + self.payload_calls.get()
    }
}

impl TokenCodec for MockCodec {
    fn is_healthy(&self) -> bool {
        self.health_calls.set(self.health_calls.get() + 1);
        self.token
            .as_ref()
            .is_some_and(|t| self.valid.contains_key(t))
    }

    fn payload(&self) -> Option<&TokenPayload> {
        self.payload_calls.set(self.payload_calls.get() + 1);
        self.token.as_ref().and_then(|t| self.valid.get(t))
    }

    fn set_token(&mut self, token: &str) {
        self.set_calls += 1;
        self.token = Some(token.to_string());
    }

    fn forget_token(&mut self) {
        self.token = None;
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn new_token<U: Authenticatable + ?Sized>(
        &mut self,
        user: &U,
        claims: &TokenPayload,
    ) -> Result<String, TokenError> {
        if self.fail_signing {
            return Err(TokenError::InvalidKey("test".into()));
        }
        let token = format!("minted-{}", user.auth_id());
        self.minted.push(claims.clone());
        self.valid.insert(token.clone(), claims.clone());
        self.token = Some(token.clone());
        Ok(token)
    }
}

/// Directory double keyed by username, credentials `{user, pass}`.
#[derive(Default)]
struct MockProvider {
    users: Vec<(String, String, User)>,
    by_id_calls: Cell<usize>,
    by_credentials_calls: Cell<usize>,
    validate_calls: Cell<usize>,
}

impl MockProvider {
    fn with_user(name: &str, pass: &str, user: &User) -> Self {
        Self {
            users: vec![(name.to_string(), pass.to_string(), user.clone())],
            ..Self::default()
        }
    }

    fn lookups(&self) -> usize {
        self.by_id_calls.get() + self.by_credentials_calls.get() + self.validate_calls.get()
    }
}

impl UserProvider for MockProvider {
    type User = User;

    fn retrieve_by_id(&self, id: Uuid) -> Option<User> {
        self.by_id_calls.set(self.by_id_calls.get() + 1);
        self.users
            .iter()
            .find(|(_, _, u)| u.id == id)
            .map(|(_, _, u)| u.clone())
    }

    fn retrieve_by_credentials(&self, credentials: &Credentials) -> Option<User> {
        self.by_credentials_calls
            .set(self.by_credentials_calls.get() + 1);
        let name = credentials.get("user")?;
        self.users
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, _, u)| u.clone())
    }

    fn validate_credentials(&self, user: &User, credentials: &Credentials) -> bool {
        self.validate_calls.set(self.validate_calls.get() + 1);
        self.users
            .iter()
            .any(|(_, p, u)| u.id == user.id && Some(p.as_str()) == credentials.get("pass"))
    }
}

fn ada() -> User {
    User::new("ada@example.com", "Ada", "Lovelace")
}

fn headers(authorization: Option<&str>) -> HeaderMap {
    let mut map = HeaderMap::new();
    if let Some(value) = authorization {
        map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    }
    map
}

type TestGuard = Guard<MockCodec, MockProvider, HeaderMap>;

fn guard(codec: MockCodec, provider: MockProvider, authorization: Option<&str>) -> TestGuard {
    Guard::new(codec, provider, headers(authorization))
}

#[test]
fn no_header_and_no_token_means_nobody() {
    let mut g = guard(MockCodec::default(), MockProvider::default(), None);

    assert_eq!(g.token_for_request(), None);
    assert!(g.current_user().is_none());
    assert!(g.guest());
    assert_eq!(g.id(), None);
}

#[test]
fn bearer_header_yields_token() {
    let mut g = guard(MockCodec::default(), MockProvider::default(), Some("Bearer abc123"));

    assert_eq!(g.token_for_request(), Some("abc123"));
    assert_eq!(g.codec().set_calls, 1);
}

#[test]
fn malformed_headers_yield_no_token() {
    for value in ["Bearer ", "Bearer    ", "abc123", "Basic abc123", "bearer abc123"] {
        let mut g = guard(MockCodec::default(), MockProvider::default(), Some(value));
        assert_eq!(g.token_for_request(), None, "header {value:?}");
    }
}

#[test]
fn malformed_header_drops_a_rejected_token() {
    let mut codec = MockCodec::default();
    codec.token = Some("rejected".into());
    let mut g = guard(codec, MockProvider::default(), Some("Token nope"));

    assert_eq!(g.token_for_request(), None);
}

#[test]
fn unhealthy_token_is_replaced_from_header() {
    let user = ada();
    let mut codec = MockCodec::accepting("fresh", &user);
    codec.token = Some("stale".into());
    let mut g = guard(codec, MockProvider::with_user("a", "right", &user), Some("Bearer fresh"));

    assert_eq!(g.token_for_request(), Some("fresh"));
    assert_eq!(g.current_user(), Some(&user));
}

#[test]
fn healthy_token_is_not_replaced_from_header() {
    let user = ada();
    let mut codec = MockCodec::accepting("old", &user);
    codec.token = Some("old".into());
    let mut g = guard(codec, MockProvider::default(), Some("Bearer new"));

    assert_eq!(g.token_for_request(), Some("old"));
    assert_eq!(g.codec().set_calls, 0);
}

#[test]
fn for_request_primes_the_codec() {
    let user = ada();
    let mut g = Guard::for_request(
        MockCodec::accepting("abc123", &user),
        MockProvider::with_user("a", "right", &user),
        headers(Some("Bearer abc123")),
    );

    assert_eq!(g.codec().token(), Some("abc123"));
    assert_eq!(g.current_user(), Some(&user));
    assert!(g.check());
}

#[test]
fn current_user_resolves_once() {
    let user = ada();
    let mut codec = MockCodec::accepting("abc123", &user);
    codec.token = Some("abc123".into());
    let mut g = guard(codec, MockProvider::with_user("a", "right", &user), None);

    let first = g.current_user().cloned();
    let codec_lookups = g.codec().lookups();
    let second = g.current_user().cloned();

    assert_eq!(first, Some(user));
    assert_eq!(first, second);
    assert_eq!(g.codec().health_calls.get(), 1);
    assert_eq!(g.codec().payload_calls.get(), 1);
    assert_eq!(g.codec().lookups(), codec_lookups);
    assert_eq!(g.provider().by_id_calls.get(), 1);
}

#[test]
fn unknown_subject_is_cached_as_nobody() {
    let stranger = ada();
    let mut codec = MockCodec::accepting("abc123", &stranger);
    codec.token = Some("abc123".into());
    let mut g = guard(codec, MockProvider::default(), None);

    assert!(g.current_user().is_none());
    assert!(g.current_user().is_none());
    assert!(g.guest());
    assert_eq!(g.provider().by_id_calls.get(), 1);
    assert_eq!(g.codec().health_calls.get(), 1);
}

#[test]
fn unhealthy_token_never_reaches_the_directory() {
    let user = ada();
    let mut codec = MockCodec::default();
    codec.token = Some("forged".into());
    let mut g = guard(codec, MockProvider::with_user("a", "right", &user), None);

    assert!(g.current_user().is_none());
    assert_eq!(g.codec().payload_calls.get(), 0);
    assert_eq!(g.provider().by_id_calls.get(), 0);
}

#[test]
fn attempt_with_wrong_password_fails_cleanly() {
    let user = ada();
    let mut g = guard(
        MockCodec::default(),
        MockProvider::with_user("a", "right", &user),
        None,
    );

    let creds = Credentials::new().with("user", "a").with("pass", "wrong");
    assert!(!g.attempt(&creds));
    assert_eq!(g.last_attempted(), Some(&user));
    assert!(!g.has_user());
    assert!(g.current_user().is_none());
    assert!(g.codec().minted.is_empty());
}

#[test]
fn attempt_with_unknown_user_fails() {
    let mut g = guard(MockCodec::default(), MockProvider::default(), None);

    let creds = Credentials::new().with("user", "ghost").with("pass", "x");
    assert!(!g.attempt(&creds));
    assert!(g.last_attempted().is_none());
    assert_eq!(g.provider().validate_calls.get(), 0);
}

#[test]
fn attempt_with_right_password_logs_in() {
    let user = ada();
    let mut g = guard(
        MockCodec::default(),
        MockProvider::with_user("a", "right", &user),
        None,
    );

    let creds = Credentials::new().with("user", "a").with("pass", "right");
    assert!(g.attempt(&creds));
    assert_eq!(g.cached_user(), Some(&user));
    assert_eq!(g.current_user(), Some(&user));

    g.login(user.clone()).unwrap();
    let claims = g.codec().minted.last().unwrap();
    assert_eq!(claims.context, "market");
    assert_eq!(claims.user_id, user.id);
    assert_eq!(claims.email, "ada@example.com");
    assert_eq!(claims.name, "Ada Lovelace");
}

#[test]
fn attempt_survives_signing_failure() {
    let user = ada();
    let codec = MockCodec {
        fail_signing: true,
        ..MockCodec::default()
    };
    let mut g = guard(codec, MockProvider::with_user("a", "right", &user), None);

    let creds = Credentials::new().with("user", "a").with("pass", "right");
    assert!(g.attempt(&creds));
    assert_eq!(g.cached_user(), Some(&user));
}

#[test]
fn login_skips_codec_and_directory() {
    let user = ada();
    let mut g = guard(MockCodec::default(), MockProvider::default(), None);

    let token = g.login(user.clone()).unwrap();
    assert_eq!(token, format!("minted-{}", user.id));

    let health_before = g.codec().health_calls.get();
    assert_eq!(g.current_user(), Some(&user));
    assert_eq!(g.codec().health_calls.get(), health_before);
    assert_eq!(g.codec().payload_calls.get(), 0);
    assert_eq!(g.provider().lookups(), 0);
}

#[test]
fn issuing_without_user_is_an_error() {
    let mut g = guard(MockCodec::default(), MockProvider::default(), None);

    assert!(matches!(
        g.issue_token_for_user(),
        Err(GuardError::NoCurrentUser)
    ));

    // Resolving to nobody does not make a user appear either.
    assert!(g.current_user().is_none());
    assert!(matches!(
        g.issue_token_for_user(),
        Err(GuardError::NoCurrentUser)
    ));
}

#[test]
fn signing_failure_surfaces_from_login() {
    let codec = MockCodec {
        fail_signing: true,
        ..MockCodec::default()
    };
    let mut g = guard(codec, MockProvider::default(), None);

    let err = g.login(ada()).unwrap_err();
    assert!(matches!(err, GuardError::Token(TokenError::InvalidKey(_))));
}

#[test]
fn set_user_overrides_a_negative_resolution() {
    let user = ada();
    let mut g = guard(MockCodec::default(), MockProvider::default(), None);

    assert!(g.current_user().is_none());
    g.set_user(user.clone());
    assert_eq!(g.current_user(), Some(&user));
    assert_eq!(g.id(), Some(user.id));
}

#[test]
fn set_user_chains() {
    let first = ada();
    let second = User::new("grace@example.com", "Grace", "Hopper");
    let mut g = guard(MockCodec::default(), MockProvider::default(), None);

    let token = g
        .set_user(first)
        .set_user(second.clone())
        .issue_token_for_user()
        .unwrap();
    assert_eq!(token, format!("minted-{}", second.id));
}

#[test]
fn forget_user_logs_out_for_the_request() {
    let user = ada();
    let mut g = guard(
        MockCodec::default(),
        MockProvider::with_user("a", "right", &user),
        None,
    );
    g.login(user).unwrap();

    g.forget_user();
    assert!(!g.has_user());
    assert!(g.current_user().is_none());
    assert!(g.codec().token().is_none());
}

#[test]
fn authenticate_rejects_guests() {
    let user = ada();
    let mut g = guard(MockCodec::default(), MockProvider::default(), None);
    assert!(matches!(g.authenticate(), Err(GuardError::Unauthenticated)));

    g.set_user(user.clone());
    assert_eq!(g.authenticate().unwrap(), &user);
}

#[test]
fn validate_does_not_log_in() {
    let user = ada();
    let mut g = guard(
        MockCodec::default(),
        MockProvider::with_user("a", "right", &user),
        None,
    );

    assert!(g.validate(&Credentials::new().with("user", "a").with("pass", "right")));
    assert_eq!(g.last_attempted(), Some(&user));
    assert!(!g.has_user());
    assert!(g.codec().minted.is_empty());

    assert!(!g.validate(&Credentials::new().with("user", "a").with("pass", "nope")));
}

#[test]
fn set_request_swaps_the_header_source() {
    let mut g = guard(MockCodec::default(), MockProvider::default(), None);
    assert_eq!(g.token_for_request(), None);

    g.set_request(headers(Some("Bearer later")));
    assert_eq!(g.request().len(), 1);
    assert_eq!(g.token_for_request(), Some("later"));
}
