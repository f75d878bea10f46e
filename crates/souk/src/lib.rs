//! # Souk
//!
//! Client SDK for the Souk marketplace backend.
//!
//! Souk keeps a user signed in across restarts and makes every API call
//! survive an expired access token: a 401 triggers one token refresh and
//! one retry, and a failed refresh signs the user out everywhere.
//!
//! ## Layers
//!
//! | Crate            | Role                                                  |
//! |------------------|-------------------------------------------------------|
//! | `souk-transport` | HTTP calls as plain values, `reqwest` implementation  |
//! | `souk-store`     | The four persisted session entries                    |
//! | `souk-protocol`  | Wire types, endpoints, form validation                |
//! | `souk-session`   | Refresh, authenticated pipeline, session state        |
//! | `souk-market`    | Profile, products, news feed                          |
//! | `souk-search`    | Debounced search scheduling                           |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use souk::prelude::*;
//!
//! # async fn run() -> Result<(), SoukError> {
//! souk::telemetry::init("souk=info");
//! let client = SoukClientBuilder::from_env().build()?;
//!
//! if !client.start().await.is_authenticated {
//!     client.session().login("me@example.com", "hunter22").await?;
//! }
//! let mine = client.products().list(&ProductQuery::default().page(1, 10)).await?;
//! println!("{} listings", mine.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
pub mod telemetry;

pub use client::{SoukClient, SoukClientBuilder};
pub use config::{
    ClientConfig, DEFAULT_STORE_PATH, ENV_BASE_URL, ENV_STORE_PATH, ENV_TIMEOUT_SECS,
    ENV_TOKEN_TTL,
};
pub use error::SoukError;

pub use souk_market as market;
pub use souk_protocol as protocol;
pub use souk_search as search;
pub use souk_session as session;
pub use souk_store as store;
pub use souk_transport as transport;

/// Everything an app needs for the common flows.
pub mod prelude {
    pub use crate::{ClientConfig, SoukClient, SoukClientBuilder, SoukError};
    pub use souk_market::{
        Feed, FilePicker, ImagePicker, ImageSource, MarketError, PickOutcome, ProductDraft,
        ProductQuery, ProfileUpdate,
    };
    pub use souk_protocol::{Location, Post, Product, User};
    pub use souk_search::{Query, QueryScheduler, SearchConfig, SearchOutcome};
    pub use souk_session::{
        AuthFailure, AuthStatus, FailureKind, Session, SessionConfig, SessionObserver, SignupForm,
    };
    pub use souk_store::{FileStore, MemoryStore, SessionStore};
    pub use souk_transport::{HttpTransport, ImageAsset};
}
