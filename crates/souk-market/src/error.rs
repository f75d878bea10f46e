//! Error types for the market layer.

use souk_session::{ApiError, NETWORK_MESSAGE};
use souk_transport::TransportError;

/// Errors from profile, product, and feed operations.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// The call went out and failed (network, non-2xx, bad body).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A form failed client-side checks. The message is user-facing.
    #[error("{0}")]
    Invalid(String),

    /// A picked image couldn't be read from disk.
    #[error("cannot read image: {0}")]
    Image(#[source] TransportError),

    /// The device can't do what was asked (e.g. no camera).
    #[error("{0} is not available on this device")]
    Unsupported(&'static str),
}

impl MarketError {
    /// A sentence for the screen: the validation message, the network
    /// message, the server's reason, or `fallback`, in that order.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Invalid(message) => message.clone(),
            Self::Api(e) if e.is_network() => NETWORK_MESSAGE.to_string(),
            Self::Api(e) => e.server_message().unwrap_or_else(|| fallback.to_string()),
            Self::Image(_) | Self::Unsupported(_) => fallback.to_string(),
        }
    }
}
