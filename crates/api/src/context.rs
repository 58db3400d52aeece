use idgate_auth::{User, UserProfile};

/// Identity attached to a request once its credential has been verified.
///
/// Only present on routes behind the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user: User,
}

impl AuthenticatedUser {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn profile(&self) -> UserProfile {
        self.user.profile()
    }
}
