//! Redirect interception and terminal-redirect classification
//!
//! Every navigation inside the embedded surface is either in-flow (let the
//! browser load it) or terminal (matches the configured redirect URI). The
//! terminal redirect is never loaded; its query parameters decide the flow
//! outcome. Only the first terminal redirect counts.

use crate::surface::{NavigationObserver, SurfaceDelegate};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Outcome parsed from a terminal redirect URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// Implicit flow: tokens delivered directly in the redirect.
    ImplicitSuccess {
        access_token: String,
        /// Read from the redirect's own `refresh_token` parameter. An
        /// earlier implementation read it from `access_token`, which was a
        /// copy-paste defect; the parameters are distinct here.
        refresh_token: Option<String>,
        id_token: String,
    },

    /// Code flow: a short-lived code to exchange over the back channel.
    CodeSuccess {
        code: String,
        /// Secret supplied by the redirect itself. Untrusted; a configured
        /// secret always wins over this one.
        client_secret: Option<String>,
    },

    /// The provider reported failure (`success=false`).
    Denied { reason: String },

    /// The redirect matched the URI prefix but carried no recognizable
    /// parameter shape.
    Unrecognized { reason: String },
}

/// Event delivered to the pending login.
#[derive(Debug)]
pub enum FlowEvent {
    /// The terminal redirect was observed and classified.
    Redirect(RedirectOutcome),

    /// The surface was dismissed before any terminal redirect.
    Dismissed,
}

/// Classifies navigations against the redirect URI and delivers the single
/// terminal event for a flow.
///
/// The event sender is consumed on the first terminal event (redirect or
/// dismissal), which is what enforces exactly-once delivery: later
/// navigations and a dismissal racing the redirect both find the sender
/// already gone.
pub struct RedirectInterceptor {
    redirect_uri: String,
    outcome_tx: Mutex<Option<mpsc::UnboundedSender<FlowEvent>>>,
}

impl RedirectInterceptor {
    pub fn new(redirect_uri: impl Into<String>, outcome_tx: mpsc::UnboundedSender<FlowEvent>) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            outcome_tx: Mutex::new(Some(outcome_tx)),
        }
    }

    /// Whether the terminal event has already been delivered.
    pub fn is_terminated(&self) -> bool {
        self.outcome_tx.lock().is_none()
    }

    fn deliver(&self, event: FlowEvent) {
        let Some(tx) = self.outcome_tx.lock().take() else {
            debug!("Flow already terminated; ignoring {:?}", event);
            return;
        };
        // The receiver may be gone if the login future was dropped; nothing
        // left to notify then.
        let _ = tx.send(event);
    }
}

impl NavigationObserver for RedirectInterceptor {
    fn on_navigation_started(&self, url: &str) {
        debug!("Navigation started: {}", url);
    }

    fn on_navigation_finished(&self, url: &str) {
        debug!("Navigation finished: {}", url);
    }

    fn on_should_intercept(&self, url: &str) -> bool {
        if !url.starts_with(&self.redirect_uri) {
            return false;
        }

        info!("Terminal redirect observed");
        self.deliver(FlowEvent::Redirect(classify_redirect(url)));

        // Never let the surface load the redirect URI itself.
        true
    }
}

impl SurfaceDelegate for RedirectInterceptor {
    fn on_dismissed(&self) {
        info!("Browser surface dismissed");
        self.deliver(FlowEvent::Dismissed);
    }
}

/// Classify a terminal redirect URL by its query parameters.
pub fn classify_redirect(url: &str) -> RedirectOutcome {
    let params = parse_query(url);

    match params.get("success").map(String::as_str) {
        Some("true") => {
            if let Some(access_token) = params.get("access_token") {
                let Some(id_token) = params.get("id_token") else {
                    return RedirectOutcome::Unrecognized {
                        reason: "implicit redirect missing id_token".to_string(),
                    };
                };
                return RedirectOutcome::ImplicitSuccess {
                    access_token: access_token.clone(),
                    refresh_token: params.get("refresh_token").cloned(),
                    id_token: id_token.clone(),
                };
            }

            if let Some(code) = params.get("code") {
                return RedirectOutcome::CodeSuccess {
                    code: code.clone(),
                    client_secret: params.get("client_secret").cloned(),
                };
            }

            RedirectOutcome::Unrecognized {
                reason: "success redirect with neither tokens nor code".to_string(),
            }
        }
        Some("false") => RedirectOutcome::Denied {
            reason: "authorization denied or failed".to_string(),
        },
        _ => {
            warn!("Redirect without a success parameter");
            RedirectOutcome::Unrecognized {
                reason: "redirect missing success parameter".to_string(),
            }
        }
    }
}

/// Parse the query string of a URL into decoded key/value pairs.
fn parse_query(url: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    let Some((_, query)) = url.split_once('?') else {
        return params;
    };
    // Fragments never carry flow parameters here; drop one if present.
    let query = query.split('#').next().unwrap_or(query);

    for pair in query.split('&') {
        let mut it = pair.splitn(2, '=');
        let key = it.next().unwrap_or_default();
        if key.is_empty() {
            continue;
        }
        let value = it.next().unwrap_or_default();
        let value = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_else(|_| value.to_string());
        params.insert(key.to_string(), value);
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    const REDIRECT_URI: &str = "https://example.com/callback";

    fn interceptor() -> (RedirectInterceptor, mpsc::UnboundedReceiver<FlowEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (RedirectInterceptor::new(REDIRECT_URI, tx), rx)
    }

    #[test]
    fn test_implicit_success_classification() {
        let outcome = classify_redirect(&format!(
            "{}?success=true&access_token=AT&refresh_token=RT&id_token=IT",
            REDIRECT_URI
        ));
        assert_eq!(
            outcome,
            RedirectOutcome::ImplicitSuccess {
                access_token: "AT".to_string(),
                refresh_token: Some("RT".to_string()),
                id_token: "IT".to_string(),
            }
        );
    }

    #[test]
    fn test_implicit_refresh_token_not_mirrored_from_access_token() {
        let outcome = classify_redirect(&format!(
            "{}?success=true&access_token=AT&id_token=IT",
            REDIRECT_URI
        ));
        // No refresh_token parameter means no refresh token, not a copy of
        // the access token.
        assert_eq!(
            outcome,
            RedirectOutcome::ImplicitSuccess {
                access_token: "AT".to_string(),
                refresh_token: None,
                id_token: "IT".to_string(),
            }
        );
    }

    #[test]
    fn test_code_success_classification() {
        let outcome = classify_redirect(&format!(
            "{}?success=true&code=C&client_secret=S",
            REDIRECT_URI
        ));
        assert_eq!(
            outcome,
            RedirectOutcome::CodeSuccess {
                code: "C".to_string(),
                client_secret: Some("S".to_string()),
            }
        );
    }

    #[test]
    fn test_denied_classification() {
        let outcome = classify_redirect(&format!("{}?success=false", REDIRECT_URI));
        assert!(matches!(outcome, RedirectOutcome::Denied { .. }));
    }

    #[test]
    fn test_unrecognized_shapes() {
        assert!(matches!(
            classify_redirect(&format!("{}?foo=bar", REDIRECT_URI)),
            RedirectOutcome::Unrecognized { .. }
        ));
        assert!(matches!(
            classify_redirect(&format!("{}?success=true", REDIRECT_URI)),
            RedirectOutcome::Unrecognized { .. }
        ));
        assert!(matches!(
            classify_redirect(&format!("{}?success=true&access_token=AT", REDIRECT_URI)),
            RedirectOutcome::Unrecognized { .. }
        ));
    }

    #[test]
    fn test_query_values_are_percent_decoded() {
        let outcome = classify_redirect(&format!(
            "{}?success=true&code=a%2Fb&client_secret=s%3Dt",
            REDIRECT_URI
        ));
        assert_eq!(
            outcome,
            RedirectOutcome::CodeSuccess {
                code: "a/b".to_string(),
                client_secret: Some("s=t".to_string()),
            }
        );
    }

    #[test]
    fn test_in_flow_navigation_is_not_intercepted() {
        let (interceptor, mut rx) = interceptor();
        assert!(!interceptor.on_should_intercept("https://appleid.apple.com/auth/authorize?x=1"));
        assert!(!interceptor.is_terminated());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_first_terminal_redirect_wins() {
        let (interceptor, mut rx) = interceptor();

        assert!(interceptor
            .on_should_intercept(&format!("{}?success=true&code=FIRST", REDIRECT_URI)));
        assert!(interceptor.is_terminated());

        // Later navigations are still stopped but deliver nothing.
        assert!(interceptor
            .on_should_intercept(&format!("{}?success=true&code=SECOND", REDIRECT_URI)));
        interceptor.on_dismissed();

        let event = rx.try_recv().unwrap();
        match event {
            FlowEvent::Redirect(RedirectOutcome::CodeSuccess { code, .. }) => {
                assert_eq!(code, "FIRST")
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dismissal_delivers_exactly_once() {
        let (interceptor, mut rx) = interceptor();

        interceptor.on_dismissed();
        interceptor.on_dismissed();

        assert!(matches!(rx.try_recv().unwrap(), FlowEvent::Dismissed));
        assert!(rx.try_recv().is_err());
    }
}
