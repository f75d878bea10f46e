//! Unified error type for the Souk client.

use souk_market::MarketError;
use souk_protocol::ProtocolError;
use souk_session::{ApiError, AuthFailure, FailureKind};
use souk_store::StoreError;
use souk_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// With the `souk` crate you handle this one type instead of importing
/// errors from each layer. Every variant has a `From` impl, so `?` converts
/// layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum SoukError {
    /// No answer from the server, or the request couldn't be built.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The persisted session couldn't be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A body didn't parse, or a field didn't validate.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An authenticated call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Login, signup, or password reset was refused.
    #[error(transparent)]
    Auth(#[from] AuthFailure),

    /// A profile, listing, or feed operation failed.
    #[error(transparent)]
    Market(#[from] MarketError),

    /// The client couldn't be configured.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SoukError {
    /// True when the cause is "no connection to the server".
    pub fn is_network(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_network(),
            Self::Api(e) | Self::Market(MarketError::Api(e)) => e.is_network(),
            Self::Auth(e) => e.kind == FailureKind::Network,
            _ => false,
        }
    }
}
