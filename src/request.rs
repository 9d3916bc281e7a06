/*
 * Responsibility
 * - abstract "something with headers" so the guard is not tied to one request type
 * - Bearer token extraction from the Authorization header
 */
use axum::http::{HeaderMap, Request, header, request::Parts};

const BEARER_PREFIX: &str = "Bearer ";

/// Read-only view of an inbound request.
pub trait RequestContext {
    /// Value of header `name`, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    fn authorization(&self) -> Option<&str> {
        self.header(header::AUTHORIZATION.as_str())
    }
}

impl RequestContext for HeaderMap {
    fn header(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.to_str().ok())
    }
}

impl RequestContext for Parts {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.header(name)
    }
}

impl<B> RequestContext for Request<B> {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers().header(name)
    }
}

impl<T: RequestContext + ?Sized> RequestContext for &T {
    fn header(&self, name: &str) -> Option<&str> {
        (**self).header(name)
    }
}

/// Pull the token out of an `Authorization` value.
///
/// The prefix is the literal, case-sensitive `Bearer `; the token is the first
/// whitespace-delimited field after it. Anything else yields `None`.
pub fn parse_bearer(value: &str) -> Option<&str> {
    value
        .strip_prefix(BEARER_PREFIX)?
        .split_whitespace()
        .next()
}
