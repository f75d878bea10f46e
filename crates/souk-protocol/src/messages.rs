//! Request and response bodies.
//!
//! Every backend response is wrapped in the same envelope:
//!
//! ```json
//! { "success": true, "data": { ... }, "message": "optional" }
//! ```
//!
//! and every error body carries its human-readable reason either at
//! `error.message` or at `message`.

use serde::{Deserialize, Serialize};

use crate::User;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `POST /auth/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub token_expires_in: String,
}

/// `POST /auth/refresh-token`
#[derive(Debug, Clone, Serialize)]
pub struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
    pub token_expires_in: String,
}

/// `POST /auth/forgot-password`
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// `POST /auth/verify-otp`
#[derive(Debug, Clone, Serialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

/// `POST /auth/resend-verification-otp`
#[derive(Debug, Clone, Serialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// The wrapper around every response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Only some endpoints set this; `None` is not the same as `false`.
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// `true` only when the server explicitly said `success: true`.
    pub fn is_confirmed(&self) -> bool {
        self.success == Some(true)
    }
}

/// `data` of a login response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// `data` of a refresh response. The token is optional on purpose: a 2xx
/// without a token is a failed refresh, not a decode error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessTokenData {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// `data` of profile responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    pub user: User,
}

/// `data` of responses that only carry a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageData {
    #[serde(default)]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Error bodies
// ---------------------------------------------------------------------------

/// The `error` member of an error body. Only the object form carries a
/// reason; a bare string or any other shape is tolerated and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Object {
        #[serde(default)]
        message: Option<String>,
    },
    Other(#[allow(dead_code)] serde_json::Value),
}

/// The body of a non-2xx response.
///
/// Parsed leniently: anything that isn't a JSON object yields an empty
/// `ErrorBody` whose [`message`](Self::message) is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    /// Parses an error body, never failing.
    pub fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    /// The server's reason: `error.message` first, then `message`. Blank
    /// strings count as absent.
    pub fn message(&self) -> Option<&str> {
        let nested = match &self.error {
            Some(ErrorDetail::Object { message }) => message.as_deref(),
            _ => None,
        };
        nested
            .filter(|m| !m.trim().is_empty())
            .or_else(|| self.message.as_deref().filter(|m| !m.trim().is_empty()))
    }
}
