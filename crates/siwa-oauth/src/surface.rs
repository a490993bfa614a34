//! Host-implemented embedded browser surface
//!
//! The core never talks to a UI toolkit directly. The host supplies a
//! [`BrowserSurface`] (a modal web view, typically) and routes its
//! navigation lifecycle into the [`SurfaceDelegate`] the flow controller
//! hands it. All presentation calls carry UI-context affinity: the host must
//! marshal `present`/`dismiss` onto whatever execution context owns its UI.
//! Delegate callbacks may arrive from that context; the core serializes them
//! internally.

use siwa_types::AuthResult;
use std::sync::Arc;

/// Navigation lifecycle observed inside the embedded browser.
pub trait NavigationObserver: Send + Sync {
    /// A page load started. Hosts typically show the loading indicator here.
    fn on_navigation_started(&self, _url: &str) {}

    /// A page load finished. Hosts typically hide the loading indicator here.
    fn on_navigation_finished(&self, _url: &str) {}

    /// Decide whether a navigation should be intercepted. Returning `true`
    /// means the surface must NOT load the URL; the flow has consumed it.
    fn on_should_intercept(&self, url: &str) -> bool;
}

/// Full delegate for a presented surface: navigation plus the close
/// affordance.
pub trait SurfaceDelegate: NavigationObserver {
    /// The user dismissed the surface (close button, back gesture, ...)
    /// without a terminal redirect.
    fn on_dismissed(&self);
}

/// Presentation options for the modal surface.
#[derive(Debug, Clone)]
pub struct SurfaceOptions {
    /// Fraction of the host viewport height the surface should occupy.
    pub height_fraction: f32,

    /// Whether to show a loading indicator while pages load.
    pub show_loading_indicator: bool,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            height_fraction: 0.9,
            show_loading_indicator: true,
        }
    }
}

/// A modal embedded browser surface supplied by the host UI shell.
pub trait BrowserSurface: Send + Sync {
    /// Present the surface pointed at `url` and route its lifecycle into
    /// `delegate`. Must be marshaled onto the host's UI-owning context.
    fn present(
        &self,
        url: &str,
        options: &SurfaceOptions,
        delegate: Arc<dyn SurfaceDelegate>,
    ) -> AuthResult<()>;

    /// Dismiss the surface if it is showing. Safe to call more than once.
    fn dismiss(&self);
}
