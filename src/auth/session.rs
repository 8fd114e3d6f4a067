//! Logged-in session state.

use crate::api::User;

/// Who is logged in, and with which bearer token.
///
/// Initialised by [`AuthSession::login`] and torn down by
/// [`AuthSession::logout`].
#[derive(Clone, Default)]
pub struct AuthSession {
    token: Option<String>,
    user: Option<User>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("has_token", &self.token.is_some())
            .field("user", &self.user.as_ref().map(|u| &u.email))
            .finish()
    }
}

impl AuthSession {
    /// Logged-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session holding a token whose owner is not yet known.
    ///
    /// Not authenticated until [`login`](Self::login) supplies the user.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            user: None,
        }
    }

    pub fn login(&mut self, user: User, token: impl Into<String>) {
        tracing::debug!(user = %user.email, "Session initialised");
        self.user = Some(user);
        self.token = Some(token.into());
    }

    /// Clears the token and user.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!(user = %user.email, "Logged out");
        }
        self.token = None;
    }

    /// True when both a token and a user are present.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub(crate) fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Role label for display; staff when unknown.
    pub fn role_label(&self) -> &'static str {
        self.user.as_ref().map_or("staff", |u| u.role.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::stub_user;

    #[test]
    fn test_login_logout() {
        let mut session = AuthSession::new();
        assert!(!session.is_authenticated());

        session.login(stub_user(), "tok");
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok"));
        assert_eq!(session.role_label(), "staff");

        session.logout();
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), None);
        assert!(session.user().is_none());
    }

    #[test]
    fn test_token_alone_is_not_authenticated() {
        let session = AuthSession::with_token("tok");
        assert!(!session.is_authenticated());
        assert_eq!(session.token(), Some("tok"));
    }

    #[test]
    fn test_debug_hides_token() {
        let mut session = AuthSession::new();
        session.login(stub_user(), "super-secret");
        assert!(!format!("{session:?}").contains("super-secret"));
    }
}
