//! LINE login models: OAuth state and token DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Separates the passphrase from the redirect target in a serialized state.
pub const STATE_DELIMITER: char = '|';

/// Anti-forgery value round-tripped through the LINE authorization redirect.
///
/// Serialized as `passphrase|redirect`, or just `passphrase` when there is no
/// redirect. The passphrase must not contain the delimiter; the redirect may.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    passphrase: String,
    redirect: Option<String>,
}

impl State {
    pub fn new(passphrase: impl Into<String>, redirect: Option<String>) -> Self {
        Self {
            passphrase: passphrase.into(),
            redirect: redirect.filter(|r| !r.is_empty()),
        }
    }

    /// Parses a decrypted state string. Never fails: a string without a
    /// delimiter is all passphrase.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(STATE_DELIMITER) {
            Some((passphrase, redirect)) => Self::new(passphrase, Some(redirect.to_string())),
            None => Self::new(raw, None),
        }
    }

    /// Exact, case-sensitive passphrase comparison.
    pub fn matches(&self, passphrase: &str) -> bool {
        self.passphrase == passphrase
    }

    /// Redirect target, empty when none was carried.
    pub fn redirect(&self) -> &str {
        self.redirect.as_deref().unwrap_or_default()
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.redirect {
            Some(redirect) => write!(f, "{}{}{}", self.passphrase, STATE_DELIMITER, redirect),
            None => write!(f, "{}", self.passphrase),
        }
    }
}

/// Result of exchanging a LINE authorization code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineAccessToken {
    pub id_token: String,
    pub expires_in: i64,
}

/// Session token handed to the LIFF client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtTokenInfo {
    pub token: String,
    pub expires_in: i64,
}

/// Query parameters of the login page redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginPageQuery {
    #[serde(default)]
    pub redirect: Option<String>,
}

/// Query parameters LINE appends to the callback URL.
#[derive(Debug, Clone, Deserialize)]
pub struct LineCallbackQuery {
    pub code: String,
    pub state: String,
}

/// Request to exchange an authorization code for a LINE ID token.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LineTokenRequest {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
}

/// Request to exchange a LINE ID token for a session token.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionTokenRequest {
    #[validate(length(min = 1, message = "lineToken is required"))]
    pub line_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_with_redirect() {
        let state = State::new("Hello World!", Some("/lockers/3?tab=usage".into()));
        assert_eq!(state.to_string(), "Hello World!|/lockers/3?tab=usage");

        let parsed = State::parse(&state.to_string());
        assert_eq!(parsed, state);
        assert!(parsed.matches("Hello World!"));
        assert_eq!(parsed.redirect(), "/lockers/3?tab=usage");
    }

    #[test]
    fn test_state_without_redirect() {
        let state = State::new("Hello World!", None);
        assert_eq!(state.to_string(), "Hello World!");
        assert_eq!(State::parse("Hello World!").redirect(), "");
    }

    #[test]
    fn test_empty_redirect_is_none() {
        assert_eq!(State::new("p", Some(String::new())).to_string(), "p");
        assert_eq!(State::parse("p|"), State::new("p", None));
    }

    #[test]
    fn test_redirect_may_contain_delimiter() {
        let parsed = State::parse("Hello World!|a|b");
        assert!(parsed.matches("Hello World!"));
        assert_eq!(parsed.redirect(), "a|b");
    }

    #[test]
    fn test_passphrase_comparison_is_exact() {
        assert!(!State::parse("hello world").matches("Hello World!"));
        assert!(!State::parse("Hello World").matches("Hello World!"));
        assert!(!State::parse("").matches("Hello World!"));
    }

    #[test]
    fn test_session_token_request_field_name() {
        let req: SessionTokenRequest = serde_json::from_str(r#"{"lineToken":"abc"}"#).unwrap();
        assert_eq!(req.line_token, "abc");
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_token_dtos_serialize_camel_case() {
        let json = serde_json::to_value(JwtTokenInfo {
            token: "t".into(),
            expires_in: 3600,
        })
        .unwrap();
        assert_eq!(json["token"], "t");
        assert_eq!(json["expiresIn"], 3600);
    }
}
