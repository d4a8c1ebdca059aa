//! Persisted shopper session.

use crate::user::User;
use serde::{Deserialize, Serialize};

/// Tokens and user returned by login, sign-up and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: User,
    /// Older servers call this field `token`.
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl AuthSession {
    pub fn new(user: User, access_token: impl Into<String>) -> Self {
        Self {
            user,
            access_token: access_token.into(),
            refresh_token: None,
        }
    }

    pub fn with_refresh_token(mut self, token: impl Into<String>) -> Self {
        self.refresh_token = Some(token.into());
        self
    }

    /// Swap in refreshed tokens. A missing refresh token keeps the old one.
    pub fn rotate(&mut self, access_token: String, refresh_token: Option<String>) {
        self.access_token = access_token;
        if let Some(refresh) = refresh_token {
            self.refresh_token = Some(refresh);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_legacy_token_field() {
        let session: AuthSession = serde_json::from_str(
            r#"{"user": {"id": 3, "name": "Otieno", "email": "o@example.co.ke"}, "token": "abc"}"#,
        )
        .unwrap();
        assert_eq!(session.access_token, "abc");
        assert_eq!(session.refresh_token, None);
    }

    #[test]
    fn test_rotate_keeps_refresh_token_when_absent() {
        let mut session =
            AuthSession::new(User::new(1, "A", "a@example.co.ke"), "a1").with_refresh_token("r1");
        session.rotate("a2".into(), None);
        assert_eq!(session.access_token, "a2");
        assert_eq!(session.refresh_token.as_deref(), Some("r1"));

        session.rotate("a3".into(), Some("r2".into()));
        assert_eq!(session.refresh_token.as_deref(), Some("r2"));
    }
}
