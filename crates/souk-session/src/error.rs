//! Error types for the session layer.
//!
//! Two audiences, two shapes:
//!
//! - [`ApiError`] and [`RefreshError`] are for code. They keep the status,
//!   the raw body, and the underlying cause.
//! - [`AuthFailure`] is for people. It carries one sentence that a login
//!   or signup screen can show as-is.

use souk_protocol::{ErrorBody, ProtocolError};
use souk_transport::{ApiResponse, TransportError};

/// Shown when a request never got an answer.
pub const NETWORK_MESSAGE: &str =
    "Network error: unable to reach the server. Please check your connection.";

/// Last-resort message when the server gave no reason.
pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Why an API call through the pipeline failed.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No answer at all (offline, DNS, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status.
    ///
    /// For a 401 whose refresh failed, this is the ORIGINAL 401: status
    /// and body are exactly what the first attempt received.
    #[error("server returned HTTP {status}")]
    Status { status: u16, body: Vec<u8> },

    /// A 2xx body that didn't have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] ProtocolError),

    /// A 2xx envelope without the `data` member the caller needed.
    #[error("response has no data")]
    MissingData,
}

impl ApiError {
    /// Turns a non-2xx response into an error, keeping its body.
    pub fn from_response(response: ApiResponse) -> Self {
        Self::Status {
            status: response.status,
            body: response.body,
        }
    }

    /// The HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(ApiResponse::UNAUTHORIZED)
    }

    /// `true` when the request never got an answer.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_network())
    }

    /// The reason the server gave, if any.
    pub fn server_message(&self) -> Option<String> {
        match self {
            Self::Status { body, .. } => {
                ErrorBody::parse(body).message().map(str::to_owned)
            }
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RefreshError
// ---------------------------------------------------------------------------

/// A refresh attempt that failed hard.
///
/// A rejected or malformed refresh is NOT an error: the refresher reports
/// it as "no token" (`Ok(None)`). Only a request that got no answer ends
/// up here. `Clone` because one outcome is shared by every request that
/// waited on the same refresh.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefreshError {
    #[error("refresh request failed: {0}")]
    Transport(#[from] TransportError),
}

// ---------------------------------------------------------------------------
// AuthFailure
// ---------------------------------------------------------------------------

/// Rough category of an [`AuthFailure`], for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A field failed client-side checks; nothing was sent.
    Validation,
    /// The server couldn't be reached.
    Network,
    /// The server answered and said no.
    Rejected,
}

/// A user-facing authentication failure.
///
/// `Display` is just the message, so `err.to_string()` is what the screen
/// shows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct AuthFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl AuthFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A client-side check failed.
    pub fn validation(error: ProtocolError) -> Self {
        Self::new(FailureKind::Validation, error.to_string())
    }

    /// Maps a pipeline error to a screen message.
    ///
    /// Network failures get [`NETWORK_MESSAGE`]. Server answers get the
    /// server's reason when it gave one, else `fallback`.
    pub fn from_api(error: &ApiError, fallback: &str) -> Self {
        if error.is_network() {
            return Self::new(FailureKind::Network, NETWORK_MESSAGE);
        }
        let message = error
            .server_message()
            .unwrap_or_else(|| fallback.to_string());
        Self::new(FailureKind::Rejected, message)
    }
}
