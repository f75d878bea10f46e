//! HTTP transport abstraction for Souk.
//!
//! Provides the [`HttpTransport`] trait that the session pipeline sends
//! every API call through, plus the value types describing a call
//! ([`ApiRequest`]) and its answer ([`ApiResponse`]).
//!
//! # Feature Flags
//!
//! - `reqwest` (default): real HTTP transport via `reqwest`
//! - `test-util`: [`ScriptedTransport`], a fake that replays canned
//!   responses and records what was sent

mod error;
mod request;
#[cfg(feature = "reqwest")]
mod reqwest_transport;
#[cfg(any(test, feature = "test-util"))]
mod scripted;

pub use error::TransportError;
pub use request::{
    ApiRequest, ApiResponse, DEFAULT_IMAGE_NAME, DEFAULT_IMAGE_TYPE, FormPart,
    ImageAsset, Method, RequestBody,
};
#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;
#[cfg(any(test, feature = "test-util"))]
pub use scripted::ScriptedTransport;

use std::future::Future;
use std::time::Duration;

/// Base URL of the marketplace backend.
pub const DEFAULT_BASE_URL: &str = "https://backend-practice.eurisko.me/api";

/// Settings for building a transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// API root every request path is appended to.
    pub base_url: String,
    /// Upper bound on a single request, connect to last body byte.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Sends API requests and returns whatever the server answered.
///
/// Implementations must attach `Authorization: Bearer <token>` exactly when
/// [`ApiRequest::bearer`] is set, and must return non-2xx answers as
/// `Ok(ApiResponse)`. Only "no answer at all" is an error.
pub trait HttpTransport: Send + Sync + 'static {
    /// Sends one request.
    fn send(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_backend() {
        let cfg = TransportConfig::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_network_errors_classified() {
        assert!(TransportError::Timeout.is_network());
        assert!(TransportError::Unreachable("dns".into()).is_network());
        assert!(!TransportError::InvalidRequest("bad".into()).is_network());
        assert!(!TransportError::Body("eof".into()).is_network());
    }
}
