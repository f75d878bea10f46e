//! Shared fixtures for the session integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::json;
use souk_protocol::endpoints::{LOGIN, PROFILE, REFRESH_TOKEN};
use souk_session::{ApiClient, SessionConfig, SessionManager};
use souk_store::{MemoryStore, StoreKey};
use souk_transport::{Method, ScriptedTransport};

pub type Client = ApiClient<ScriptedTransport, MemoryStore>;
pub type Manager = SessionManager<ScriptedTransport, MemoryStore>;

pub const CACHED_USER: &str = r#"{"_id":"u1","email":"a@b.com","firstName":"Ada"}"#;

/// An unsigned JWT whose payload is `claims`.
pub fn jwt(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}

/// Everything a test needs, wired the way the facade wires it.
pub struct Harness {
    pub transport: Arc<ScriptedTransport>,
    pub store: Arc<MemoryStore>,
    pub client: Arc<Client>,
    pub manager: Manager,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(MemoryStore::new(), SessionConfig::default())
    }

    pub fn with(store: MemoryStore, config: SessionConfig) -> Self {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(store);
        let client = Arc::new(ApiClient::new(
            Arc::clone(&transport),
            Arc::clone(&store),
            config,
        ));
        let manager = SessionManager::new(Arc::clone(&client));
        Self {
            transport,
            store,
            client,
            manager,
        }
    }

    /// A store holding a complete signed-in record.
    pub fn signed_in_store() -> MemoryStore {
        MemoryStore::with_entries([
            (StoreKey::AccessToken, "old"),
            (StoreKey::RefreshToken, "r1"),
            (StoreKey::User, CACHED_USER),
            (StoreKey::UserId, "u1"),
        ])
    }

    /// A second manager over the same transport and store, as after an
    /// app relaunch.
    pub fn relaunch(&self) -> Manager {
        let client = Arc::new(ApiClient::new(
            Arc::clone(&self.transport),
            Arc::clone(&self.store),
            SessionConfig::default(),
        ));
        SessionManager::new(client)
    }

    pub fn script_login(&self, user_id: &str) {
        self.transport.respond(
            Method::Post,
            LOGIN,
            200,
            json!({
                "success": true,
                "data": {
                    "accessToken": jwt(json!({ "userId": user_id })),
                    "refreshToken": "r1"
                }
            }),
        );
    }

    pub fn script_profile(&self, user_id: &str) {
        self.transport.respond(
            Method::Get,
            PROFILE,
            200,
            json!({
                "success": true,
                "data": { "user": { "_id": user_id, "email": "a@b.com", "firstName": "Ada" } }
            }),
        );
    }

    pub fn script_refresh_ok(&self, token: &str) {
        self.transport.respond(
            Method::Post,
            REFRESH_TOKEN,
            200,
            json!({ "success": true, "data": { "accessToken": token } }),
        );
    }

    pub fn script_refresh_rejected(&self) {
        self.transport.respond(
            Method::Post,
            REFRESH_TOKEN,
            401,
            json!({ "message": "Invalid refresh token" }),
        );
    }
}
