//! Authorization URL construction and browser surface lifecycle

use crate::redirect::{FlowEvent, RedirectInterceptor};
use crate::surface::{BrowserSurface, SurfaceOptions};
use crate::types::ProviderConfig;
use siwa_types::AuthResult;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use uuid::Uuid;

/// Generate a fresh anti-replay/anti-CSRF `state` nonce, unique per request.
pub fn generate_state() -> String {
    Uuid::new_v4().to_string()
}

/// Build the authorization URL for one login attempt.
pub fn build_authorization_url(config: &ProviderConfig, state: &str) -> String {
    let scope = config.scopes.join(" ");
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&response_mode=form_post&state={}",
        config.auth_url,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_uri),
        urlencoding::encode(&scope),
        urlencoding::encode(state),
    )
}

/// One login attempt's outgoing request: the fresh nonce and the URL derived
/// from it. Never persisted; discarded when the flow terminates.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub state: String,
    pub url: String,
}

impl AuthorizationRequest {
    pub fn new(config: &ProviderConfig) -> Self {
        let state = generate_state();
        let url = build_authorization_url(config, &state);
        Self { state, url }
    }
}

/// Drives the embedded browser surface for a flow: present it pointed at the
/// authorization URL with the interceptor as delegate, and dismiss it once
/// the flow terminates.
pub struct FlowController {
    surface: Arc<dyn BrowserSurface>,
    options: SurfaceOptions,
}

impl FlowController {
    pub fn new(surface: Arc<dyn BrowserSurface>) -> Self {
        Self {
            surface,
            options: SurfaceOptions::default(),
        }
    }

    /// Start a flow: build the request, present the surface, and hand back
    /// the stream that will carry the single terminal event.
    pub fn begin(
        &self,
        config: &ProviderConfig,
    ) -> AuthResult<(AuthorizationRequest, mpsc::UnboundedReceiver<FlowEvent>)> {
        let request = AuthorizationRequest::new(config);
        debug!("Authorization URL built with state {}", request.state);

        let (tx, rx) = mpsc::unbounded_channel();
        let interceptor = Arc::new(RedirectInterceptor::new(config.redirect_uri.clone(), tx));

        self.surface.present(&request.url, &self.options, interceptor)?;
        info!("Browser surface presented");

        Ok((request, rx))
    }

    /// Dismiss the surface after the flow has terminated.
    pub fn finish(&self) {
        self.surface.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ProviderConfig {
        ProviderConfig::apple("com.example.app", "https://example.com/callback")
    }

    #[test]
    fn test_build_authorization_url() {
        let config = test_config();
        let url = build_authorization_url(&config, "test_state");

        assert!(url.starts_with("https://appleid.apple.com/auth/authorize?"));
        assert!(url.contains("client_id=com.example.app"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fexample.com%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=name%20email"));
        assert!(url.contains("response_mode=form_post"));
        assert!(url.contains("state=test_state"));
    }

    #[test]
    fn test_state_is_fresh_per_request() {
        let config = test_config();
        let first = AuthorizationRequest::new(&config);
        let second = AuthorizationRequest::new(&config);

        assert_ne!(first.state, second.state);
        assert!(first.url.contains(&first.state));
        assert!(second.url.contains(&second.state));
    }
}
