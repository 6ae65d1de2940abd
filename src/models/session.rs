use serde::{Deserialize, Serialize};

/// The Session struct represents the customer currently signed in, if any.
///
/// `is_logged_in` is only ever true while `token` is non-empty. Both fields are
/// written together by the constructors below; nothing flips one without the other.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub is_logged_in: bool,
    pub token: String,
}

impl Session {
    /// The anonymous default: no user, no token.
    pub fn anonymous() -> Self {
        Session::default()
    }

    /// A signed-in session. An empty token yields an anonymous session for `username`.
    pub fn authenticated(username: impl Into<String>, token: impl Into<String>) -> Self {
        let token = token.into();
        Session {
            username: username.into(),
            is_logged_in: !token.is_empty(),
            token,
        }
    }

    /// Same user, new access token.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        Session::authenticated(self.username.clone(), token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_logged_in && !self.token.is_empty()
    }

    pub fn is_anonymous(&self) -> bool {
        *self == Session::anonymous()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_default() {
        let session = Session::anonymous();
        assert_eq!(session.username, "");
        assert!(!session.is_logged_in);
        assert_eq!(session.token, "");
        assert!(session.is_anonymous());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_authenticated_session() {
        let session = Session::authenticated("tester", "testToken");
        assert_eq!(
            session,
            Session {
                username: "tester".to_string(),
                is_logged_in: true,
                token: "testToken".to_string(),
            }
        );
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_empty_token_is_never_logged_in() {
        let session = Session::authenticated("tester", "");
        assert!(!session.is_logged_in);
        assert!(!session.is_authenticated());

        let renewed = Session::authenticated("tester", "abc").with_token("");
        assert!(!renewed.is_logged_in);
        assert_eq!(renewed.username, "tester");
    }

    #[test]
    fn test_with_token_keeps_username() {
        let session = Session::authenticated("tester", "old").with_token("new");
        assert_eq!(session.username, "tester");
        assert_eq!(session.token, "new");
        assert!(session.is_logged_in);
    }
}
