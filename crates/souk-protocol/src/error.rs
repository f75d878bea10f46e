//! Error types for the protocol layer.
//!
//! When you see a `ProtocolError`, the problem is in the shape of the data
//! (a body that doesn't parse, a form field that doesn't validate), not in
//! networking or in the session.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: the server returned HTML instead of JSON, a required
    /// field is missing, or a field has the wrong type.
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A form field failed client-side validation. The message is meant
    /// for the user, e.g. "Please enter a valid email address".
    #[error("{0}")]
    Validation(String),
}
