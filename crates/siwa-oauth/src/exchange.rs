//! Authorization-code token exchange with the provider token endpoint

use crate::types::ProviderConfig;
use reqwest::Client;
use serde::Deserialize;
use siwa_types::{AuthError, AuthResult};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, info};

/// Bound on the whole exchange request. The browser surface is already
/// closing when the exchange runs, so a hung request must not hang the
/// caller's pending login.
const EXCHANGE_TIMEOUT_SECS: u64 = 30;

/// Token response from the provider token endpoint.
///
/// `access_token` and `id_token` are required; their absence is a malformed
/// response. `expires_in` is informational only and not enforced.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,

    /// Identity token carrying the user's claims.
    pub id_token: String,

    /// Refresh token (optional).
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Expires in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Token exchanger for the authorization-code flow.
pub struct TokenExchanger {
    client: Client,
}

impl TokenExchanger {
    /// Create a new token exchanger with the default request timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(EXCHANGE_TIMEOUT_SECS))
    }

    /// Create a token exchanger with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Exchange an authorization code for tokens.
    ///
    /// Issues a single form-encoded POST to the configured token endpoint.
    /// No retries: the code is single-use and the user-facing surface is
    /// already gone, so a retry would need a fresh authorization anyway.
    pub async fn exchange_code(
        &self,
        config: &ProviderConfig,
        authorization_code: &str,
        client_secret: &str,
    ) -> AuthResult<TokenResponse> {
        info!("Exchanging authorization code for tokens: {}", config.client_id);

        let mut params = HashMap::new();
        params.insert("grant_type".to_string(), "authorization_code".to_string());
        params.insert("code".to_string(), authorization_code.to_string());
        params.insert("redirect_uri".to_string(), config.redirect_uri.clone());
        params.insert("client_id".to_string(), config.client_id.clone());
        params.insert("client_secret".to_string(), client_secret.to_string());

        let response = self
            .client
            .post(&config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::Exchange("Token request timed out".to_string())
                } else {
                    AuthError::Exchange(format!("Failed to send token request: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Token exchange failed with status {}: {}", status, body);
            return Err(AuthError::Exchange(format!(
                "Token exchange failed with status {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AuthError::Exchange(format!("Failed to read token response: {}", e)))?;

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            AuthError::MalformedResponse(format!("Failed to parse token response: {}", e))
        })?;

        debug!(
            "Token exchange successful (expires_in: {:?})",
            token_response.expires_in
        );

        Ok(token_response)
    }
}

impl Default for TokenExchanger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(token_url: String) -> ProviderConfig {
        let mut config = ProviderConfig::apple("com.example.app", "https://example.com/cb");
        config.token_url = token_url;
        config
    }

    #[test]
    fn test_token_response_deserialization() {
        let json = r#"{
            "access_token": "at",
            "id_token": "it",
            "refresh_token": "rt",
            "expires_in": 3600
        }"#;

        let response: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.access_token, "at");
        assert_eq!(response.id_token, "it");
        assert_eq!(response.refresh_token, Some("rt".to_string()));
        assert_eq!(response.expires_in, Some(3600));
    }

    #[test]
    fn test_token_response_requires_id_token() {
        let json = r#"{"access_token": "at"}"#;
        assert!(serde_json::from_str::<TokenResponse>(json).is_err());
    }

    #[tokio::test]
    async fn test_exchange_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=CODE123"))
            .and(body_string_contains("client_secret=SECRET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "at",
                "id_token": "it",
                "refresh_token": "rt",
                "expires_in": 3600
            })))
            .mount(&server)
            .await;

        let config = test_config(format!("{}/auth/token", server.uri()));
        let tokens = TokenExchanger::new()
            .exchange_code(&config, "CODE123", "SECRET")
            .await
            .unwrap();

        assert_eq!(tokens.access_token, "at");
        assert_eq!(tokens.id_token, "it");
        assert_eq!(tokens.refresh_token.as_deref(), Some("rt"));
    }

    #[tokio::test]
    async fn test_exchange_http_error_is_exchange_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server broke"))
            .mount(&server)
            .await;

        let config = test_config(format!("{}/auth/token", server.uri()));
        let err = TokenExchanger::new()
            .exchange_code(&config, "CODE123", "SECRET")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Exchange(_)), "got {:?}", err);
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_exchange_timeout_is_exchange_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(5))
                    .set_body_json(serde_json::json!({
                        "access_token": "at",
                        "id_token": "it"
                    })),
            )
            .mount(&server)
            .await;

        let config = test_config(format!("{}/auth/token", server.uri()));
        let err = TokenExchanger::with_timeout(Duration::from_millis(200))
            .exchange_code(&config, "CODE123", "SECRET")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Exchange(_)), "got {:?}", err);
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_exchange_missing_required_field_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"access_token": "at"})),
            )
            .mount(&server)
            .await;

        let config = test_config(format!("{}/auth/token", server.uri()));
        let err = TokenExchanger::new()
            .exchange_code(&config, "CODE123", "SECRET")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::MalformedResponse(_)), "got {:?}", err);
    }
}
