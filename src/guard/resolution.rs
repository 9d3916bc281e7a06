/// Per-request memo of the authenticated user.
///
/// `Resolved(None)` is a real answer: "nobody", stable for the rest of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<U> {
    Unresolved,
    Resolved(Option<U>),
}

impl<U> Default for Resolution<U> {
    fn default() -> Self {
        Self::Unresolved
    }
}

impl<U> Resolution<U> {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// The cached user, without resolving anything.
    pub fn user(&self) -> Option<&U> {
        match self {
            Self::Resolved(user) => user.as_ref(),
            Self::Unresolved => None,
        }
    }
}
