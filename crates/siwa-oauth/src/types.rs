//! Provider flow configuration

/// Apple authorization endpoint.
pub const APPLE_AUTH_URL: &str = "https://appleid.apple.com/auth/authorize";

/// Apple token endpoint.
pub const APPLE_TOKEN_URL: &str = "https://appleid.apple.com/auth/token";

/// Configuration for one provider instance.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// OAuth client ID (the Apple Services ID).
    pub client_id: String,

    /// Client secret for the code exchange. When set, it always wins over a
    /// secret supplied through the redirect URL; the redirect is an
    /// attacker-influenced surface and is only trusted as a fallback.
    pub client_secret: Option<String>,

    /// Authorization endpoint URL.
    pub auth_url: String,

    /// Token endpoint URL.
    pub token_url: String,

    /// Requested scopes.
    pub scopes: Vec<String>,

    /// Redirect URI; navigation to any URL with this prefix terminates the
    /// flow.
    pub redirect_uri: String,
}

impl ProviderConfig {
    /// Configuration for Apple's production endpoints with the default
    /// `name`/`email` scopes.
    pub fn apple(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            auth_url: APPLE_AUTH_URL.to_string(),
            token_url: APPLE_TOKEN_URL.to_string(),
            scopes: vec!["name".to_string(), "email".to_string()],
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Set a pre-configured client secret for the code exchange.
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }
}
