//! Sign in with Apple OAuth2/OIDC flow driven through an embedded web view
//!
//! The flow spans three surfaces stitched together by the provider:
//! a host-supplied modal browser surface where the user authenticates, the
//! redirect interceptor that recognizes the terminal redirect and never lets
//! it load, and the back-channel token exchange with Apple's token endpoint.
//! Session state persists across restarts through a [`siwa_store::StateStore`].
//!
//! # Usage
//! ```no_run
//! use std::sync::Arc;
//! use siwa_oauth::{AppleProvider, ProviderConfig};
//! use siwa_store::FileStore;
//!
//! # async fn run(surface: Arc<dyn siwa_oauth::BrowserSurface>) -> Result<(), String> {
//! let config = ProviderConfig::apple("com.example.app", "https://example.com/callback");
//! let store = Arc::new(FileStore::for_app("example").map_err(String::from)?);
//! let provider = AppleProvider::new(config, store, surface);
//!
//! provider.initialize();
//! provider.login().await.map_err(String::from)?;
//! assert!(provider.is_logged_in().map_err(String::from)?);
//! # Ok(())
//! # }
//! ```

pub mod codec;
mod exchange;
mod flow;
mod provider;
mod redirect;
mod surface;
mod types;

pub use exchange::{TokenExchanger, TokenResponse};
pub use flow::{build_authorization_url, generate_state, AuthorizationRequest, FlowController};
pub use provider::AppleProvider;
pub use redirect::{FlowEvent, RedirectInterceptor, RedirectOutcome};
pub use surface::{BrowserSurface, NavigationObserver, SurfaceDelegate, SurfaceOptions};
pub use types::{ProviderConfig, APPLE_AUTH_URL, APPLE_TOKEN_URL};
