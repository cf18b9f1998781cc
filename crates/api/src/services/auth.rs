//! LINE login handoff and session token issuance.
//!
//! The login flow:
//! 1. The user agent is redirected to LINE with an encrypted [`State`] that
//!    carries the configured passphrase and the page to return to.
//! 2. LINE calls back with an authorization code and the state; the state is
//!    checked and the user agent is forwarded to the front end with the code.
//! 3. The front end exchanges the code for a LINE ID token through this
//!    server, then exchanges the ID token for a session JWT.

use domain::models::{JwtTokenInfo, LineAccessToken, State};
use reqwest::Url;
use shared::crypto::StateCipher;
use shared::jwt::{decode_line_id_token, Claims, JwtConfig};
use tracing::{info, warn};

use super::line_auth::{LineAuthClient, LineAuthError};
use crate::config::Config;

const LANDING_PATH: &str = "/auth/line-landing";

/// Error type for authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid token")]
    InvalidToken,

    #[error("Authentication service misconfigured: {0}")]
    Configuration(String),

    #[error("Internal authentication error: {0}")]
    Internal(String),
}

impl From<LineAuthError> for AuthError {
    fn from(err: LineAuthError) -> Self {
        match err {
            LineAuthError::Configuration(msg) => AuthError::Configuration(msg),
            LineAuthError::Rejected(body) => AuthError::Unauthorized(body),
            other => AuthError::Unauthorized(other.to_string()),
        }
    }
}

/// Which login flow a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    User,
    Admin,
}

impl LoginKind {
    /// Path LINE redirects back to after login.
    pub fn callback_path(self) -> &'static str {
        match self {
            LoginKind::User => "/auth/line/callback",
            LoginKind::Admin => "/auth/line/admin/callback",
        }
    }
}

/// Orchestrates the LINE login handoff.
pub struct AuthService {
    cipher: StateCipher,
    jwt: JwtConfig,
    line: LineAuthClient,
    passphrase: String,
    base_url: String,
    user_landing: Url,
    admin_landing: Url,
}

impl AuthService {
    pub fn new(config: &Config) -> Result<Self, AuthError> {
        let landing = |base: &str| {
            Url::parse(&format!("{}{}", base.trim_end_matches('/'), LANDING_PATH))
                .map_err(|e| AuthError::Configuration(format!("{}: {}", base, e)))
        };

        let jwt = JwtConfig::with_leeway(
            &config.jwt.secret,
            config.jwt.expiry_secs,
            config.jwt.leeway_secs,
        )
        .map_err(|e| AuthError::Configuration(e.to_string()))?;

        Ok(Self {
            cipher: StateCipher::from_secret(&config.line.channel_secret),
            jwt,
            line: LineAuthClient::new(&config.line)?,
            passphrase: config.line.state_passphrase.clone(),
            base_url: config.server.base_url.trim_end_matches('/').to_string(),
            user_landing: landing(&config.frontend.liff_url)?,
            admin_landing: landing(&config.frontend.admin_url)?,
        })
    }

    fn callback_url(&self, kind: LoginKind) -> String {
        format!("{}{}", self.base_url, kind.callback_path())
    }

    /// Builds the LINE authorization URL for a login flow.
    pub fn build_login_url(
        &self,
        kind: LoginKind,
        redirect_target: Option<&str>,
    ) -> Result<String, AuthError> {
        let state = State::new(
            self.passphrase.as_str(),
            redirect_target.map(str::to_string),
        );
        let encrypted = self
            .cipher
            .encrypt(&state.to_string())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(self.line.authorize_url(&self.callback_url(kind), &encrypted))
    }

    /// Checks a user login callback and returns the LIFF landing URL.
    pub fn resolve_callback(
        &self,
        access_code: &str,
        encrypted_state: &str,
    ) -> Result<String, AuthError> {
        let state = self.open_state(encrypted_state)?;

        let mut url = self.user_landing.clone();
        url.query_pairs_mut()
            .append_pair("code", access_code)
            .append_pair("redirect", state.redirect());
        Ok(url.into())
    }

    /// Checks an admin login callback and returns the admin landing URL.
    pub fn resolve_admin_callback(
        &self,
        access_code: &str,
        encrypted_state: &str,
    ) -> Result<String, AuthError> {
        self.open_state(encrypted_state)?;

        let mut url = self.admin_landing.clone();
        url.query_pairs_mut().append_pair("code", access_code);
        Ok(url.into())
    }

    /// Succeeds when the state decrypts and carries the configured passphrase.
    pub fn validate_state(&self, encrypted_state: &str) -> Result<bool, AuthError> {
        self.open_state(encrypted_state).map(|_| true)
    }

    fn open_state(&self, encrypted_state: &str) -> Result<State, AuthError> {
        let decrypted = self.cipher.decrypt(encrypted_state).map_err(|e| {
            warn!(error = %e, "OAuth state could not be decrypted");
            AuthError::Unauthorized("Invalid state".into())
        })?;

        let state = State::parse(&decrypted);
        if !state.matches(&self.passphrase) {
            warn!("OAuth state passphrase mismatch");
            return Err(AuthError::Unauthorized("Invalid state".into()));
        }
        Ok(state)
    }

    /// Exchanges an authorization code issued for `kind`'s callback.
    pub async fn exchange_code_for_token(
        &self,
        kind: LoginKind,
        code: &str,
    ) -> Result<LineAccessToken, AuthError> {
        self.line
            .exchange_code(code, &self.callback_url(kind))
            .await
            .map_err(|e| {
                warn!(error = %e, ?kind, "LINE code exchange failed");
                AuthError::from(e)
            })
    }

    /// Mints a session token for the subject of a LINE ID token.
    ///
    /// The ID token's signature is not checked: it was obtained over the
    /// authenticated token exchange.
    pub fn issue_session_token(&self, line_id_token: &str) -> Result<JwtTokenInfo, AuthError> {
        let claims = decode_line_id_token(line_id_token).map_err(|_| {
            warn!("LINE ID token could not be decoded");
            AuthError::InvalidToken
        })?;

        let issued = self
            .jwt
            .generate_token(&claims.sub, claims.picture.as_deref())
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        info!(jti = %issued.jti, "Session token issued");
        Ok(JwtTokenInfo {
            token: issued.token,
            expires_in: issued.expires_in,
        })
    }

    /// Validates a session token presented as a bearer credential.
    pub fn validate_session_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.jwt.validate_token(token).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            AuthError::InvalidToken
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        let config = Config::load_for_test(&[]).unwrap();
        AuthService::new(&config).unwrap()
    }

    fn seal(service: &AuthService, plain: &str) -> String {
        service.cipher.encrypt(plain).unwrap()
    }

    fn query(url: &str) -> std::collections::HashMap<String, String> {
        Url::parse(url).unwrap().query_pairs().into_owned().collect()
    }

    #[test]
    fn test_login_kind_callback_paths() {
        assert_eq!(LoginKind::User.callback_path(), "/auth/line/callback");
        assert_eq!(LoginKind::Admin.callback_path(), "/auth/line/admin/callback");
    }

    #[test]
    fn test_build_login_url_embeds_decryptable_state() {
        let service = service();
        let url = service
            .build_login_url(LoginKind::User, Some("/lockers/3"))
            .unwrap();
        let params = query(&url);

        assert_eq!(
            params["redirect_uri"],
            "https://api.locker.test/auth/line/callback"
        );
        let state = service.cipher.decrypt(&params["state"]).unwrap();
        assert_eq!(state, "Hello World!|/lockers/3");
        assert!(service.validate_state(&params["state"]).unwrap());
    }

    #[test]
    fn test_build_admin_login_url() {
        let service = service();
        let url = service.build_login_url(LoginKind::Admin, None).unwrap();
        let params = query(&url);

        assert_eq!(
            params["redirect_uri"],
            "https://api.locker.test/auth/line/admin/callback"
        );
        assert_eq!(service.cipher.decrypt(&params["state"]).unwrap(), "Hello World!");
    }

    #[test]
    fn test_validate_state_requires_exact_passphrase() {
        let service = service();

        assert!(service
            .validate_state(&seal(&service, "Hello World!"))
            .unwrap());
        assert!(matches!(
            service.validate_state(&seal(&service, "hello world")),
            Err(AuthError::Unauthorized(_))
        ));
        assert!(matches!(
            service.validate_state("not-encrypted"),
            Err(AuthError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_resolve_callback() {
        let service = service();
        let state = seal(&service, "Hello World!|/lockers/3");

        let url = service.resolve_callback("abc", &state).unwrap();

        assert!(url.starts_with("https://liff.locker.test/auth/line-landing?"));
        let params = query(&url);
        assert_eq!(params["code"], "abc");
        assert_eq!(params["redirect"], "/lockers/3");
    }

    #[test]
    fn test_resolve_callback_without_redirect() {
        let service = service();
        let url = service
            .resolve_callback("abc", &seal(&service, "Hello World!"))
            .unwrap();
        assert_eq!(query(&url)["redirect"], "");
    }

    #[test]
    fn test_resolve_callback_rejects_bad_state() {
        let service = service();
        let result = service.resolve_callback("abc", &seal(&service, "Goodbye|/x"));
        assert!(matches!(result, Err(AuthError::Unauthorized(_))));
    }

    #[test]
    fn test_resolve_admin_callback() {
        let service = service();
        let url = service
            .resolve_admin_callback("xyz", &seal(&service, "Hello World!"))
            .unwrap();

        assert!(url.starts_with("https://admin.locker.test/auth/line-landing?"));
        let params = query(&url);
        assert_eq!(params["code"], "xyz");
        assert!(!params.contains_key("redirect"));
    }

    #[test]
    fn test_issue_session_token() {
        let service = service();
        let id_token = jsonwebtoken::encode(
            &jsonwebtoken::Header::default(),
            &serde_json::json!({
                "sub": "U1234567890abcdef",
                "picture": "https://profile.line-scdn.net/abc"
            }),
            &jsonwebtoken::EncodingKey::from_secret(b"line"),
        )
        .unwrap();

        let info = service.issue_session_token(&id_token).unwrap();
        assert_eq!(info.expires_in, 3600);

        let claims = service.validate_session_token(&info.token).unwrap();
        assert_eq!(claims.sub, "U1234567890abcdef");
        assert_eq!(
            claims.picture.as_deref(),
            Some("https://profile.line-scdn.net/abc")
        );
    }

    #[test]
    fn test_issue_session_token_rejects_garbage() {
        let service = service();
        assert!(matches!(
            service.issue_session_token("garbage"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_validate_session_token_rejects_garbage() {
        assert!(matches!(
            service().validate_session_token("not.a.jwt"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_line_errors_map_to_unauthorized() {
        let err: AuthError = LineAuthError::Rejected("invalid_grant".into()).into();
        assert!(matches!(err, AuthError::Unauthorized(msg) if msg == "invalid_grant"));

        let err: AuthError = LineAuthError::Transport("connection refused".into()).into();
        assert!(matches!(err, AuthError::Unauthorized(msg) if msg.contains("connection refused")));
    }
}
