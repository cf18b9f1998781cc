//! LINE Login OAuth 2.0 client.
//!
//! Builds authorization URLs and performs the server-to-server exchange of an
//! authorization code for an ID token.

use std::time::Duration;

use domain::models::LineAccessToken;
use reqwest::Url;
use serde::Deserialize;

use crate::config::LineConfig;

const SCOPE: &str = "openid profile";

/// Error type for LINE token endpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum LineAuthError {
    #[error("Invalid LINE endpoint configuration: {0}")]
    Configuration(String),

    #[error("LINE rejected the token request: {0}")]
    Rejected(String),

    #[error("LINE token request failed: {0}")]
    Transport(String),

    #[error("Unexpected LINE token response: {0}")]
    InvalidResponse(String),
}

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    id_token: String,
    expires_in: i64,
}

/// Client for the LINE authorize and token endpoints.
pub struct LineAuthClient {
    http_client: reqwest::Client,
    authorize_url: Url,
    token_url: Url,
    channel_id: String,
    channel_secret: String,
}

impl LineAuthClient {
    /// Creates a client for the configured channel.
    pub fn new(config: &LineConfig) -> Result<Self, LineAuthError> {
        let parse = |raw: &str| {
            Url::parse(raw).map_err(|e| LineAuthError::Configuration(format!("{}: {}", raw, e)))
        };

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| LineAuthError::Configuration(e.to_string()))?;

        Ok(Self {
            http_client,
            authorize_url: parse(&config.authorize_url)?,
            token_url: parse(&config.token_url)?,
            channel_id: config.channel_id.clone(),
            channel_secret: config.channel_secret.clone(),
        })
    }

    /// Builds the URL the user agent is sent to for LINE login.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.channel_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state)
            .append_pair("scope", SCOPE);
        url.into()
    }

    /// Exchanges an authorization code for an ID token.
    ///
    /// `redirect_uri` must be the callback URL the code was issued for.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<LineAccessToken, LineAuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", self.channel_id.as_str()),
            ("client_secret", self.channel_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| LineAuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(|e| {
                LineAuthError::InvalidResponse(format!("HTTP {}: {}", status, e))
            })?;
            tracing::debug!(status = status.as_u16(), "LINE token endpoint returned an error");
            if body.is_empty() {
                return Err(LineAuthError::Rejected(format!("HTTP {}", status)));
            }
            return Err(LineAuthError::Rejected(body));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| LineAuthError::InvalidResponse(e.to_string()))?;

        Ok(LineAccessToken {
            id_token: token.id_token,
            expires_in: token.expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn line_config(token_url: &str) -> LineConfig {
        LineConfig {
            channel_id: "1234567890".into(),
            channel_secret: "channel-secret".into(),
            authorize_url: "https://access.line.me/oauth2/v2.1/authorize".into(),
            token_url: token_url.into(),
            request_timeout_secs: 5,
            state_passphrase: "Hello World!".into(),
        }
    }

    #[test]
    fn test_authorize_url_parameters() {
        let client = LineAuthClient::new(&line_config("https://api.line.me/oauth2/v2.1/token"))
            .unwrap();
        let url = client.authorize_url("https://api.locker.test/auth/line/callback", "s t");
        let parsed = Url::parse(&url).unwrap();
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert!(url.starts_with("https://access.line.me/oauth2/v2.1/authorize?"));
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["client_id"], "1234567890");
        assert_eq!(
            pairs["redirect_uri"],
            "https://api.locker.test/auth/line/callback"
        );
        assert_eq!(pairs["state"], "s t");
        assert_eq!(pairs["scope"], "openid profile");
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        let result = LineAuthClient::new(&line_config("not a url"));
        assert!(matches!(result, Err(LineAuthError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/v2.1/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=abc"))
            .and(body_string_contains("client_secret=channel-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at",
                "token_type": "Bearer",
                "expires_in": 2592000,
                "id_token": "id.token.value",
                "scope": "openid profile"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            LineAuthClient::new(&line_config(&format!("{}/oauth2/v2.1/token", server.uri())))
                .unwrap();
        let token = client
            .exchange_code("abc", "https://api.locker.test/auth/line/callback")
            .await
            .unwrap();

        assert_eq!(token.id_token, "id.token.value");
        assert_eq!(token.expires_in, 2592000);
    }

    #[tokio::test]
    async fn test_exchange_code_rejected_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"error":"invalid_grant","error_description":"code expired"}"#,
            ))
            .mount(&server)
            .await;

        let client = LineAuthClient::new(&line_config(&server.uri())).unwrap();
        let err = client.exchange_code("old", "cb").await.unwrap_err();

        assert!(matches!(err, LineAuthError::Rejected(body) if body.contains("invalid_grant")));
    }

    #[tokio::test]
    async fn test_exchange_code_rejected_without_body_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = LineAuthClient::new(&line_config(&server.uri())).unwrap();
        let err = client.exchange_code("abc", "cb").await.unwrap_err();

        assert!(matches!(err, LineAuthError::Rejected(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_exchange_code_transport_failure() {
        let client = LineAuthClient::new(&line_config("http://127.0.0.1:1/token")).unwrap();
        let err = client.exchange_code("abc", "cb").await.unwrap_err();
        assert!(matches!(err, LineAuthError::Transport(_)));
    }
}
