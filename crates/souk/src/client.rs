//! `SoukClient` builder and wiring.
//!
//! This is the entry point for apps. It ties the layers together:
//! transport → store → authenticated pipeline → session → market APIs.

use std::sync::Arc;

use souk_market::{Feed, PostsApi, ProductsApi, ProfileApi};
use souk_search::QueryScheduler;
use souk_session::{ApiClient, Session, SessionManager};
use souk_store::{FileStore, SessionStore};
use souk_transport::{HttpTransport, ReqwestTransport, TransportConfig};

use crate::{ClientConfig, SoukError};

/// Builder for configuring a [`SoukClient`].
///
/// # Example
///
/// ```rust,no_run
/// use souk::prelude::*;
///
/// # async fn run() -> Result<(), SoukError> {
/// let client = SoukClient::builder()
///     .base_url("http://localhost:3000/api")
///     .store_path("/tmp/souk.json")
///     .build()?;
/// let session = client.start().await;
/// println!("signed in: {}", session.is_authenticated);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SoukClientBuilder {
    config: ClientConfig,
}

impl SoukClientBuilder {
    /// A builder with [`ClientConfig::default`] settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder seeded from the `SOUK_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            config: ClientConfig::from_env(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.transport.base_url = url.into();
        self
    }

    pub fn transport_config(mut self, transport: TransportConfig) -> Self {
        self.config.transport = transport;
        self
    }

    pub fn store_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config.store_path = path.into();
        self
    }

    /// Builds a client over HTTP with the session in a JSON file.
    pub fn build(self) -> Result<SoukClient<ReqwestTransport, FileStore>, SoukError> {
        if self.config.transport.base_url.trim().is_empty() {
            return Err(SoukError::Config("base URL is empty".into()));
        }
        let transport = ReqwestTransport::new(self.config.transport.clone())?;
        let store = FileStore::new(&self.config.store_path);
        tracing::debug!(
            base_url = %self.config.transport.base_url,
            store = %self.config.store_path.display(),
            "souk client built"
        );
        Ok(self.build_with(Arc::new(transport), Arc::new(store)))
    }

    /// Builds a client over a caller-supplied transport and store.
    pub fn build_with<T: HttpTransport, S: SessionStore>(
        self,
        transport: Arc<T>,
        store: Arc<S>,
    ) -> SoukClient<T, S> {
        let config = self.config;
        let api = Arc::new(ApiClient::new(transport, store, config.session.clone()));
        let session = SessionManager::new(Arc::clone(&api));
        let profile = ProfileApi::new(Arc::clone(&api), config.profile.clone());
        let products = ProductsApi::new(Arc::clone(&api));
        SoukClient {
            config,
            api,
            session,
            profile,
            products,
        }
    }
}

/// A configured marketplace client.
///
/// Call [`start`](Self::start) once before anything else so the persisted
/// session is picked up.
pub struct SoukClient<T, S> {
    config: ClientConfig,
    api: Arc<ApiClient<T, S>>,
    session: SessionManager<T, S>,
    profile: ProfileApi<T, S>,
    products: ProductsApi<T, S>,
}

impl SoukClient<ReqwestTransport, FileStore> {
    /// Creates a builder.
    pub fn builder() -> SoukClientBuilder {
        SoukClientBuilder::new()
    }
}

impl<T: HttpTransport, S: SessionStore> SoukClient<T, S> {
    /// Restores the persisted session. Never fails: a missing or broken
    /// record just means signed out.
    pub async fn start(&self) -> Session {
        let session = self.session.restore().await;
        tracing::info!(status = ?session.status(), "souk client started");
        session
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The authenticated pipeline, for endpoints without a typed wrapper.
    pub fn api(&self) -> &Arc<ApiClient<T, S>> {
        &self.api
    }

    pub fn session(&self) -> &SessionManager<T, S> {
        &self.session
    }

    pub fn profile(&self) -> &ProfileApi<T, S> {
        &self.profile
    }

    pub fn products(&self) -> &ProductsApi<T, S> {
        &self.products
    }

    /// A fresh news feed starting at page 1.
    pub fn feed(&self) -> Feed<T, S> {
        Feed::new(PostsApi::new(Arc::clone(&self.api)), self.config.feed.clone())
    }

    /// A scheduler for one search box.
    pub fn search(&self) -> QueryScheduler {
        QueryScheduler::new(self.config.search.clone())
    }
}
