//! Exchanging the refresh token for a new access token.

use std::sync::Arc;

use souk_protocol::endpoints::REFRESH_TOKEN;
use souk_protocol::{AccessTokenData, Codec, Envelope, JsonCodec, RefreshRequest};
use souk_store::{SessionStore, StoreKey};
use souk_transport::{ApiRequest, HttpTransport};

use crate::RefreshError;

/// Calls `POST /auth/refresh-token` with the stored refresh token.
///
/// Talks to the transport directly, never through the
/// [`ApiClient`](crate::ApiClient): a 401 from the refresh endpoint must
/// not trigger another refresh.
pub struct TokenRefresher<T, S> {
    transport: Arc<T>,
    store: Arc<S>,
    token_expires_in: String,
}

impl<T: HttpTransport, S: SessionStore> TokenRefresher<T, S> {
    pub fn new(transport: Arc<T>, store: Arc<S>, token_expires_in: impl Into<String>) -> Self {
        Self {
            transport,
            store,
            token_expires_in: token_expires_in.into(),
        }
    }

    /// Tries to obtain a fresh access token.
    ///
    /// Returns:
    /// - `Ok(Some(token))`: the new token, already written to the store
    ///   (only the access token; the refresh token is left as is)
    /// - `Ok(None)`: no refresh token stored, the server said no, or the
    ///   answer had no token in it
    /// - `Err(_)`: the refresh request got no answer
    pub async fn refresh(&self) -> Result<Option<String>, RefreshError> {
        let Some(refresh_token) = self.store.get_or_absent(StoreKey::RefreshToken).await
        else {
            tracing::warn!("no refresh token stored, cannot refresh");
            return Ok(None);
        };

        let request = ApiRequest::post(REFRESH_TOKEN).json(&RefreshRequest {
            refresh_token,
            token_expires_in: self.token_expires_in.clone(),
        })?;
        let response = self.transport.send(&request).await?;

        if !response.is_success() {
            tracing::warn!(status = response.status, "refresh token rejected");
            return Ok(None);
        }

        let token = JsonCodec
            .decode::<Envelope<AccessTokenData>>(&response.body)
            .ok()
            .and_then(|envelope| envelope.data)
            .and_then(|data| data.access_token)
            .filter(|token| !token.is_empty());
        let Some(token) = token else {
            tracing::warn!("refresh response carried no access token");
            return Ok(None);
        };

        if let Err(e) = self.store.set(StoreKey::AccessToken, &token).await {
            // The token still works for this process; the next restart
            // will just refresh again.
            tracing::warn!(error = %e, "could not persist refreshed access token");
        }

        tracing::info!("access token refreshed");
        Ok(Some(token))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use souk_store::MemoryStore;
    use souk_transport::{Method, RequestBody, ScriptedTransport, TransportError};

    use super::*;

    fn refresher(
        transport: &Arc<ScriptedTransport>,
        store: &Arc<MemoryStore>,
    ) -> TokenRefresher<ScriptedTransport, MemoryStore> {
        TokenRefresher::new(Arc::clone(transport), Arc::clone(store), "1y")
    }

    #[tokio::test]
    async fn test_refresh_success_stores_access_token_only() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(
            Method::Post,
            REFRESH_TOKEN,
            200,
            json!({ "success": true, "data": { "accessToken": "fresh" } }),
        );
        let store = Arc::new(MemoryStore::with_entries([(StoreKey::RefreshToken, "r1")]));

        let token = refresher(&transport, &store).refresh().await.unwrap();

        assert_eq!(token.as_deref(), Some("fresh"));
        let entries = store.snapshot().await;
        assert_eq!(entries.get(&StoreKey::AccessToken).map(String::as_str), Some("fresh"));
        assert_eq!(entries.get(&StoreKey::RefreshToken).map(String::as_str), Some("r1"));

        let sent = transport.requests_to(Method::Post, REFRESH_TOKEN);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].bearer, None);
        assert_eq!(
            sent[0].body,
            RequestBody::Json(json!({ "refreshToken": "r1", "token_expires_in": "1y" }))
        );
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_sends_nothing() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(MemoryStore::new());

        let token = refresher(&transport, &store).refresh().await.unwrap();

        assert_eq!(token, None);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_rejected_is_none() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(Method::Post, REFRESH_TOKEN, 401, json!({ "message": "expired" }));
        let store = Arc::new(MemoryStore::with_entries([(StoreKey::RefreshToken, "r1")]));

        let token = refresher(&transport, &store).refresh().await.unwrap();

        assert_eq!(token, None);
        assert!(!store.snapshot().await.contains_key(&StoreKey::AccessToken));
    }

    #[tokio::test]
    async fn test_refresh_success_without_token_is_none() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(Method::Post, REFRESH_TOKEN, 200, json!({ "success": true, "data": {} }));
        let store = Arc::new(MemoryStore::with_entries([(StoreKey::RefreshToken, "r1")]));

        assert_eq!(refresher(&transport, &store).refresh().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_network_failure_is_error() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail(Method::Post, REFRESH_TOKEN, TransportError::Timeout);
        let store = Arc::new(MemoryStore::with_entries([(StoreKey::RefreshToken, "r1")]));

        let result = refresher(&transport, &store).refresh().await;

        assert!(matches!(result, Err(RefreshError::Transport(TransportError::Timeout))));
    }

    #[tokio::test]
    async fn test_refresh_store_read_failure_is_none() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(MemoryStore::with_entries([(StoreKey::RefreshToken, "r1")]));
        store.fail_reads_of(StoreKey::RefreshToken).await;

        assert_eq!(refresher(&transport, &store).refresh().await.unwrap(), None);
        assert!(transport.requests().is_empty());
    }
}
