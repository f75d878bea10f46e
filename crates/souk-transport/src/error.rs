/// Errors that can occur in the transport layer.
///
/// A response with a non-2xx status is NOT a transport error. The server
/// answered, so it comes back as an [`ApiResponse`](crate::ApiResponse).
/// These variants cover the cases where no answer was obtained at all.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The host could not be reached (DNS, refused connection, no network).
    #[error("server unreachable: {0}")]
    Unreachable(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request could not be built (bad URL, unreadable file part, etc.).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The server answered but the body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

impl TransportError {
    /// Returns `true` when the failure means "no connection to the server".
    ///
    /// Callers use this to pick the "check your connection" message
    /// instead of a server-rejection message.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Unreachable(_) | Self::Timeout)
    }
}
