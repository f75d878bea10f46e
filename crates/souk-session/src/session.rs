//! Session types: the in-memory picture of who is signed in.
//!
//! The [`Session`] mirrors the four persisted store entries plus two
//! flags the UI reads. It is owned by the
//! [`SessionManager`](crate::SessionManager) and published to observers
//! through a `tokio::sync::watch` channel, so any number of screens can
//! read it without holding a lock.

use souk_protocol::User;
use souk_protocol::endpoints::TOKEN_EXPIRES_IN;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Lifetime requested for access tokens on login and refresh.
    ///
    /// Default: `"1y"`.
    pub token_expires_in: String,

    /// When several requests hit a 401 at once, share one refresh call
    /// between them instead of sending one each.
    ///
    /// Default: `true`. With `false`, every 401 refreshes on its own, and
    /// refresh tokens that rotate on use will log the user out.
    pub single_flight_refresh: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_expires_in: TOKEN_EXPIRES_IN.to_string(),
            single_flight_refresh: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AuthStatus
// ---------------------------------------------------------------------------

/// Coarse state for routing between screens.
///
/// ```text
///   Restoring ──(restore)──→ SignedOut ──(login)──→ SignedIn
///       │                        ↑                     │
///       └──────(restore)─────────┼──→ SignedIn         │
///                                └──(logout / refresh fails)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    /// Initial restore still running; show a splash screen.
    Restoring,
    SignedOut,
    SignedIn,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The in-memory session.
///
/// `is_authenticated` is true only while an access token is held.
/// `is_loading` is true only until the first restore settles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
    pub user_id: Option<String>,
}

impl Session {
    /// The state at process start: empty, with restore pending.
    pub fn restoring() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn status(&self) -> AuthStatus {
        if self.is_loading {
            AuthStatus::Restoring
        } else if self.is_authenticated {
            AuthStatus::SignedIn
        } else {
            AuthStatus::SignedOut
        }
    }

    /// Forgets everything. Leaves `is_loading` false.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
