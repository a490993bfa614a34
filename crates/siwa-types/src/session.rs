//! The authenticated session value for one provider identity

use serde::{Deserialize, Serialize};

/// Authenticated state for one Apple identity.
///
/// A session is all-or-nothing: either the provider holds no session at all
/// (`Option<Session>` is `None`, logged out) or it holds one with every field
/// populated. Partial sessions are never exposed to callers.
///
/// Field names serialize as `idToken`/`refreshToken`/`accessToken` so the
/// persisted blob stays wire-compatible with previously stored state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Compact signed identity token. Opaque here beyond claim extraction.
    pub id_token: String,

    /// Refresh token, held for persistence only (no refresh flow).
    pub refresh_token: String,

    /// Access token, held for persistence only.
    pub access_token: String,
}

impl Session {
    pub fn new(
        id_token: impl Into<String>,
        refresh_token: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            id_token: id_token.into(),
            refresh_token: refresh_token.into(),
            access_token: access_token.into(),
        }
    }
}
