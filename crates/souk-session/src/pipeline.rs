//! The authenticated request pipeline.
//!
//! Every API call goes through [`ApiClient::send`]:
//!
//! ```text
//!   attach stored token ──→ send ──→ 2xx/4xx/5xx ──→ done
//!                            │
//!                            └─ 401, first attempt
//!                                 │
//!                                 ├─ refresh ok ──→ resend once with new token
//!                                 │
//!                                 └─ refresh failed ──→ clear store,
//!                                                       notify observers,
//!                                                       fail with the original 401
//! ```
//!
//! Login and signup skip the whole thing: no token, no refresh, no retry.
//!
//! # Single-flight refresh
//!
//! When several requests see a 401 at about the same time, the first one
//! starts the refresh and the rest wait on the same future
//! (`futures_util::future::Shared`). One refresh call goes out, and every
//! waiter retries with the token it produced.

use std::sync::{Arc, PoisonError, RwLock};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use rand::Rng;
use serde::de::DeserializeOwned;
use souk_protocol::{Codec, Envelope, JsonCodec, endpoints};
use souk_store::{SessionStore, StoreKey};
use souk_transport::{ApiRequest, ApiResponse, HttpTransport};
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::{ApiError, RefreshError, SessionConfig, TokenRefresher};

type RefreshFuture = Shared<BoxFuture<'static, Result<Option<String>, RefreshError>>>;

// ---------------------------------------------------------------------------
// SessionObserver
// ---------------------------------------------------------------------------

/// Gets told when the pipeline changes the session behind everyone's back.
///
/// Callbacks run synchronously inside [`ApiClient::send`], before the
/// call that caused them returns. So when a request fails because the
/// session expired, observers have already seen the expiry.
pub trait SessionObserver: Send + Sync + 'static {
    /// A refresh produced a new access token (already persisted).
    fn on_token_refreshed(&self, access_token: &str);

    /// Refresh failed; the store has been cleared. Sign the user out.
    fn on_session_expired(&self);
}

// ---------------------------------------------------------------------------
// PendingRequest
// ---------------------------------------------------------------------------

/// A request on its way through the pipeline.
///
/// `retried` is the loop guard: a request that has already been resent
/// after a refresh is never resent again, whatever the second answer.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    pub request: ApiRequest,
    pub retried: bool,
}

impl PendingRequest {
    pub fn new(request: ApiRequest) -> Self {
        Self {
            request,
            retried: false,
        }
    }

    /// The same request, carrying `token`, marked as retried.
    pub fn into_retry(mut self, token: String) -> Self {
        self.request.bearer = Some(token);
        self.retried = true;
        self
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Sends API calls with the stored credential and recovers from 401s.
///
/// Generic over the transport and the store so tests can run it against
/// [`ScriptedTransport`](souk_transport::ScriptedTransport) and
/// [`MemoryStore`](souk_store::MemoryStore).
pub struct ApiClient<T, S> {
    transport: Arc<T>,
    store: Arc<S>,
    refresher: Arc<TokenRefresher<T, S>>,
    config: SessionConfig,

    /// The refresh currently running, if any. Only used with
    /// `single_flight_refresh`.
    inflight_refresh: Mutex<Option<RefreshFuture>>,

    observers: RwLock<Vec<Arc<dyn SessionObserver>>>,
}

impl<T: HttpTransport, S: SessionStore> ApiClient<T, S> {
    pub fn new(transport: Arc<T>, store: Arc<S>, config: SessionConfig) -> Self {
        let refresher = Arc::new(TokenRefresher::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            config.token_expires_in.clone(),
        ));
        Self {
            transport,
            store,
            refresher,
            config,
            inflight_refresh: Mutex::new(None),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The store this client reads tokens from.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Registers an observer. It stays until [`remove_observer`](Self::remove_observer).
    pub fn add_observer(&self, observer: Arc<dyn SessionObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(observer);
    }

    /// Unregisters an observer added earlier. Unknown observers are ignored.
    pub fn remove_observer(&self, observer: &Arc<dyn SessionObserver>) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|o| !std::ptr::addr_eq(Arc::as_ptr(o), Arc::as_ptr(observer)));
    }

    /// Sends one request.
    ///
    /// Returns the response for any 2xx. Anything else is an error: a
    /// non-2xx answer is [`ApiError::Status`] (for a 401 whose refresh
    /// failed, it is the original 401) and no answer at all is
    /// [`ApiError::Transport`].
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let span = tracing::debug_span!(
            "api",
            request_id = %request_id(),
            method = %request.method,
            path = %request.path,
        );
        self.dispatch(request).instrument(span).await
    }

    /// Sends a request and decodes the `data` member of the envelope.
    pub async fn send_json<D: DeserializeOwned>(&self, request: ApiRequest) -> Result<D, ApiError> {
        self.send_envelope(request)
            .await?
            .data
            .ok_or(ApiError::MissingData)
    }

    /// Sends a request and decodes the whole envelope.
    pub async fn send_envelope<D: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Envelope<D>, ApiError> {
        let response = self.send(request).await?;
        Ok(JsonCodec.decode(&response.body)?)
    }

    async fn dispatch(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut pending = PendingRequest::new(request);

        if endpoints::is_unauthenticated(&pending.request.path) {
            pending.request.bearer = None;
            let response = self.transport.send(&pending.request).await?;
            tracing::debug!(status = response.status, "unauthenticated call answered");
            return into_result(response);
        }

        pending.request.bearer = self.store.get_or_absent(StoreKey::AccessToken).await;

        loop {
            let response = self.transport.send(&pending.request).await?;
            tracing::debug!(status = response.status, retried = pending.retried, "answered");

            if !response.is_unauthorized() {
                return into_result(response);
            }
            if pending.retried {
                tracing::warn!("still unauthorized after refresh, giving up");
                return Err(ApiError::from_response(response));
            }

            let token = match self.refresh_access_token().await {
                Ok(Some(token)) => token,
                Ok(None) => {
                    self.expire_session().await;
                    return Err(ApiError::from_response(response));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "token refresh failed");
                    self.expire_session().await;
                    return Err(ApiError::from_response(response));
                }
            };

            for observer in self.observers() {
                observer.on_token_refreshed(&token);
            }
            pending = pending.into_retry(token);
        }
    }

    /// Runs a refresh, or joins the one already running.
    async fn refresh_access_token(&self) -> Result<Option<String>, RefreshError> {
        if !self.config.single_flight_refresh {
            return self.refresher.refresh().await;
        }

        let shared = {
            let mut slot = self.inflight_refresh.lock().await;
            match slot.as_ref() {
                Some(inflight) => {
                    tracing::debug!("joining in-flight token refresh");
                    inflight.clone()
                }
                None => {
                    let refresher = Arc::clone(&self.refresher);
                    let refresh = async move { refresher.refresh().await }.boxed().shared();
                    *slot = Some(refresh.clone());
                    refresh
                }
            }
        };

        let outcome = shared.clone().await;

        let mut slot = self.inflight_refresh.lock().await;
        if slot.as_ref().is_some_and(|inflight| inflight.ptr_eq(&shared)) {
            *slot = None;
        }
        outcome
    }

    /// Clears every stored credential and tells observers.
    async fn expire_session(&self) {
        if let Err(e) = self.store.clear_all().await {
            tracing::error!(error = %e, "could not clear stored session");
        }
        tracing::warn!("session expired, signed out");
        for observer in self.observers() {
            observer.on_session_expired();
        }
    }

    fn observers(&self) -> Vec<Arc<dyn SessionObserver>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn into_result(response: ApiResponse) -> Result<ApiResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_response(response))
    }
}

/// A short random id to tie the log lines of one call together.
fn request_id() -> String {
    format!("{:08x}", rand::rng().random::<u32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_retry_sets_token_and_flag() {
        let pending = PendingRequest::new(ApiRequest::get("/user/profile").bearer("old"));
        assert!(!pending.retried);

        let retry = pending.into_retry("new".into());

        assert!(retry.retried);
        assert_eq!(retry.request.bearer.as_deref(), Some("new"));
        assert_eq!(retry.request.path, "/user/profile");
    }

    #[test]
    fn test_request_id_is_eight_hex_chars() {
        let id = request_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
