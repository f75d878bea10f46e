//! Session lifecycle for Souk.
//!
//! This crate handles who the user is and keeps their credential working:
//!
//! 1. **Pipeline**: every API call goes through [`ApiClient`], which
//!    attaches the stored access token, refreshes it on a 401, and retries
//!    the call once
//! 2. **Refresh**: [`TokenRefresher`] trades the refresh token for a new
//!    access token
//! 3. **Session state**: [`SessionManager`] restores the session at
//!    startup and runs login, signup, logout, and friends
//!
//! # How it fits in the stack
//!
//! ```text
//! Market / Search (above)  ← send their calls through ApiClient
//!     ↕
//! Session Layer (this crate)  ← tokens, refresh, signed-in state
//!     ↕
//! Transport + Store + Protocol (below)  ← HTTP, persistence, wire types
//! ```

mod error;
mod manager;
mod pipeline;
mod refresh;
mod session;

pub use error::{
    ApiError, AuthFailure, FailureKind, GENERIC_MESSAGE, NETWORK_MESSAGE, RefreshError,
};
pub use manager::{
    FORGOT_PASSWORD_MESSAGE, INVALID_OTP_MESSAGE, LOGIN_FAILED_MESSAGE, SIGNUP_FAILED_MESSAGE,
    SIGNUP_SUCCESS_MESSAGE, SessionManager, SignupForm,
};
pub use pipeline::{ApiClient, PendingRequest, SessionObserver};
pub use refresh::TokenRefresher;
pub use session::{AuthStatus, Session, SessionConfig};
