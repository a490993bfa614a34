//! Identity-token claim decoding and session blob serialization
//!
//! Claims are decoded without signature verification; this layer trusts the
//! token once transport is authenticated. Verification is the server's job.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::{Map, Value};
use siwa_types::{AuthError, AuthResult, Session};
use tracing::debug;

/// Decode the claims of a compact signed token (three base64url segments).
///
/// Fails with `MalformedToken` when the token does not have the expected
/// header.payload.signature structure or the payload is not a JSON object.
pub fn decode_claims(token: &str) -> AuthResult<Map<String, Value>> {
    let mut parts = token.split('.');
    let payload_b64 = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(h), Some(p), Some(s), None) if !h.is_empty() && !p.is_empty() && !s.is_empty() => p,
        _ => {
            return Err(AuthError::MalformedToken(
                "expected three dot-separated segments".to_string(),
            ))
        }
    };

    // Tolerate tokens carrying standard base64 padding.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload_b64.trim_end_matches('='))
        .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {}", e)))?;

    let payload: Value = serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::MalformedToken(format!("payload is not JSON: {}", e)))?;

    match payload {
        Value::Object(claims) => Ok(claims),
        _ => Err(AuthError::MalformedToken(
            "payload is not a JSON object".to_string(),
        )),
    }
}

/// Check whether decoded claims are expired.
///
/// Compares the `exp` claim (epoch seconds) against the current time with a
/// caller-supplied skew tolerance. An absent `exp` counts as not expired.
pub fn is_expired(claims: &Map<String, Value>, skew_secs: i64) -> bool {
    let Some(exp) = claims.get("exp").and_then(Value::as_i64) else {
        return false;
    };
    // `exp` is attacker-supplied; saturate instead of overflowing.
    exp.saturating_add(skew_secs) < chrono::Utc::now().timestamp()
}

/// Serialize a session to the opaque blob persisted in the state store.
pub fn serialize_session(session: &Session) -> AuthResult<String> {
    Ok(serde_json::to_string(session)?)
}

/// Deserialize a persisted session blob.
///
/// Malformed or partial input yields `None`, never an error: a corrupt cache
/// must not block future logins.
pub fn deserialize_session(blob: &str) -> Option<Session> {
    match serde_json::from_str(blob) {
        Ok(session) => Some(session),
        Err(e) => {
            debug!("Discarding unreadable session blob: {}", e);
            None
        }
    }
}
