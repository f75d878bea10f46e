//! Best-effort reading of access-token claims.
//!
//! The client peeks into the JWT payload for one convenience value, the
//! user id. Nothing here verifies a signature, so the result is untrusted
//! and must never gate access to anything. Every failure (wrong shape,
//! bad base64, non-JSON payload, missing claim) yields `None`.

use base64::Engine;
use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
use serde_json::Value as JsonValue;

/// Decodes the payload segment of a JWT without verifying it.
pub fn decode_unverified(token: &str) -> Option<JsonValue> {
    let mut parts = token.split('.');
    let (_header, payload) = (parts.next()?, parts.next()?);
    // A JWS has exactly three segments; anything else isn't ours to read.
    parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Extracts the `userId` claim. Numeric ids are stringified.
pub fn decode_user_id(token: &str) -> Option<String> {
    let claims = decode_unverified(token)?;
    match claims.get("userId")? {
        JsonValue::String(s) if !s.is_empty() => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
