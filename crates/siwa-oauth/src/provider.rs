//! Apple provider - owns the session and orchestrates the login flow

use crate::codec;
use crate::exchange::TokenExchanger;
use crate::flow::FlowController;
use crate::redirect::{FlowEvent, RedirectOutcome};
use crate::surface::BrowserSurface;
use crate::types::ProviderConfig;
use parking_lot::RwLock;
use siwa_store::StateStore;
use siwa_types::{AuthError, AuthResult, Session};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Fixed, provider-namespaced key for the persisted session blob.
const SESSION_STORE_KEY: &str = "apple-signin.session";

/// Overall flow timeout in seconds (5 minutes).
const FLOW_TIMEOUT_SECS: u64 = 300;

/// Sign in with Apple provider.
///
/// Owns the session (all-or-nothing, see [`Session`]) and is the only
/// component that touches the state store. One logical flow at a time: a
/// `login` while another is pending fails fast with
/// [`AuthError::FlowAlreadyInProgress`]. The pending login resolves exactly
/// once whatever terminates the flow - terminal redirect, exchange result,
/// or the user dismissing the surface.
pub struct AppleProvider {
    config: ProviderConfig,
    store: Arc<dyn StateStore>,
    exchanger: TokenExchanger,
    flow: FlowController,
    session: RwLock<Option<Session>>,
    login_in_progress: AtomicBool,
}

impl AppleProvider {
    pub fn new(
        config: ProviderConfig,
        store: Arc<dyn StateStore>,
        surface: Arc<dyn BrowserSurface>,
    ) -> Self {
        Self {
            config,
            store,
            exchanger: TokenExchanger::new(),
            flow: FlowController::new(surface),
            session: RwLock::new(None),
            login_in_progress: AtomicBool::new(false),
        }
    }

    /// Restore the session from the state store, best-effort.
    ///
    /// Absent or corrupt stored state leaves the provider logged out; it
    /// never errors. A corrupt cache must not block future logins.
    pub fn initialize(&self) {
        let blob = match self.store.get(SESSION_STORE_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                info!("No stored session to restore");
                return;
            }
            Err(e) => {
                warn!("Failed to read stored session: {}", e);
                return;
            }
        };

        match codec::deserialize_session(&blob) {
            Some(session) => {
                info!("Restored session from storage");
                *self.session.write() = Some(session);
            }
            None => warn!("Stored session blob unreadable; starting logged out"),
        }
    }

    /// Run one login flow to completion.
    ///
    /// Presents the browser surface at a freshly built authorization URL and
    /// resolves with the flow's single outcome. The surface is dismissed on
    /// every exit path.
    pub async fn login(&self) -> AuthResult<()> {
        if self.login_in_progress.swap(true, Ordering::SeqCst) {
            return Err(AuthError::FlowAlreadyInProgress);
        }

        let result = self.run_login_flow().await;

        self.flow.finish();
        self.login_in_progress.store(false, Ordering::SeqCst);

        match &result {
            Ok(()) => info!("Login completed"),
            Err(e) => warn!("Login failed: {}", e),
        }
        result
    }

    async fn run_login_flow(&self) -> AuthResult<()> {
        let (_request, mut events) = self.flow.begin(&self.config)?;

        let timeout = Duration::from_secs(FLOW_TIMEOUT_SECS);
        let event = match tokio::time::timeout(timeout, events.recv()).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                return Err(AuthError::Surface(
                    "Surface delegate dropped without an outcome".to_string(),
                ))
            }
            Err(_) => return Err(AuthError::FlowTimeout),
        };

        match event {
            FlowEvent::Redirect(outcome) => self.handle_redirect(outcome).await,
            FlowEvent::Dismissed => Err(AuthError::AuthorizationDenied(
                "login window dismissed before completion".to_string(),
            )),
        }
    }

    async fn handle_redirect(&self, outcome: RedirectOutcome) -> AuthResult<()> {
        match outcome {
            RedirectOutcome::ImplicitSuccess {
                access_token,
                refresh_token,
                id_token,
            } => {
                info!("Implicit flow succeeded; persisting tokens");
                self.persist_state(id_token, refresh_token.unwrap_or_default(), access_token)
            }
            RedirectOutcome::CodeSuccess {
                code,
                client_secret,
            } => {
                let secret = self.resolve_client_secret(client_secret)?;
                let tokens = self
                    .exchanger
                    .exchange_code(&self.config, &code, &secret)
                    .await?;
                self.persist_state(
                    tokens.id_token,
                    tokens.refresh_token.unwrap_or_default(),
                    tokens.access_token,
                )
            }
            RedirectOutcome::Denied { reason } => Err(AuthError::AuthorizationDenied(reason)),
            RedirectOutcome::Unrecognized { reason } => {
                Err(AuthError::UnrecognizedRedirect(reason))
            }
        }
    }

    /// A configured client secret always wins. The redirect-supplied secret
    /// crosses a trust boundary (the redirect URL is attacker-influenced in
    /// principle) and is only accepted when nothing is configured.
    fn resolve_client_secret(&self, from_redirect: Option<String>) -> AuthResult<String> {
        if let Some(secret) = &self.config.client_secret {
            return Ok(secret.clone());
        }
        match from_redirect {
            Some(secret) => {
                warn!("Using client secret supplied by the redirect URL");
                Ok(secret)
            }
            None => Err(AuthError::Exchange(
                "No client secret available for code exchange".to_string(),
            )),
        }
    }

    /// Clear the session and remove the stored blob.
    ///
    /// Errs with `NotLoggedIn` when there is no session; a second call errs
    /// the same way.
    pub fn logout(&self) -> AuthResult<()> {
        let mut session = self.session.write();
        if session.is_none() {
            return Err(AuthError::NotLoggedIn);
        }

        self.store.remove(SESSION_STORE_KEY)?;
        *session = None;
        info!("Logged out");
        Ok(())
    }

    /// Whether a session is present and its identity token is unexpired
    /// (zero skew). A present token that fails to decode is an error, not
    /// `false`.
    pub fn is_logged_in(&self) -> AuthResult<bool> {
        let session = self.session.read();
        let Some(session) = session.as_ref() else {
            return Ok(false);
        };

        let claims = codec::decode_claims(&session.id_token)?;
        if codec::is_expired(&claims, 0) {
            info!("Identity token expired; user is not logged in");
            return Ok(false);
        }
        Ok(true)
    }

    /// The identity token of the current session, or `NotLoggedIn`.
    pub fn get_authorization_code(&self) -> AuthResult<String> {
        self.session
            .read()
            .as_ref()
            .map(|s| s.id_token.clone())
            .ok_or(AuthError::NotLoggedIn)
    }

    /// Part of the shared provider capability surface; this provider
    /// declines.
    pub fn get_current_user(&self) -> AuthResult<serde_json::Value> {
        Err(AuthError::NotImplemented)
    }

    /// Part of the shared provider capability surface; this provider
    /// declines.
    pub fn refresh(&self) -> AuthResult<()> {
        Err(AuthError::NotImplemented)
    }

    /// Serialize and persist a freshly authenticated session, then publish
    /// it. Failure surfaces as `Persistence` and fails the pending login;
    /// the previous session stays in place.
    pub fn persist_state(
        &self,
        id_token: String,
        refresh_token: String,
        access_token: String,
    ) -> AuthResult<()> {
        let session = Session::new(id_token, refresh_token, access_token);
        let blob = codec::serialize_session(&session)
            .map_err(|e| AuthError::Persistence(e.to_string()))?;
        self.store
            .put(SESSION_STORE_KEY, &blob)
            .map_err(|e| AuthError::Persistence(e.to_string()))?;

        *self.session.write() = Some(session);
        Ok(())
    }
}
