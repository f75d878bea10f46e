//! Client configuration.
//!
//! [`ClientConfig`] gathers every layer's settings in one place. Defaults
//! talk to the production backend and keep the session in
//! `souk-session.json` in the working directory.
//!
//! # Environment
//!
//! [`ClientConfig::from_env`] overrides defaults from:
//!
//! | Variable            | Field                         | Example            |
//! |---------------------|-------------------------------|--------------------|
//! | `SOUK_BASE_URL`     | `transport.base_url`          | `http://localhost` |
//! | `SOUK_STORE_PATH`   | `store_path`                  | `/tmp/s.json`      |
//! | `SOUK_TIMEOUT_SECS` | `transport.timeout`           | `10`               |
//! | `SOUK_TOKEN_TTL`    | `session.token_expires_in`    | `30d`              |
//!
//! A variable that is unset or blank keeps the default. One that doesn't
//! parse is logged with `warn!` and also keeps the default.

use std::path::PathBuf;
use std::time::Duration;

use souk_market::{FeedConfig, ProfileConfig};
use souk_search::SearchConfig;
use souk_session::SessionConfig;
use souk_transport::TransportConfig;
use tracing::warn;

/// Default location of the persisted session record.
pub const DEFAULT_STORE_PATH: &str = "souk-session.json";

pub const ENV_BASE_URL: &str = "SOUK_BASE_URL";
pub const ENV_STORE_PATH: &str = "SOUK_STORE_PATH";
pub const ENV_TIMEOUT_SECS: &str = "SOUK_TIMEOUT_SECS";
pub const ENV_TOKEN_TTL: &str = "SOUK_TOKEN_TTL";

/// Full configuration for a [`SoukClient`](crate::SoukClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub transport: TransportConfig,
    /// Where [`FileStore`](souk_store::FileStore) keeps the session.
    pub store_path: PathBuf,
    pub session: SessionConfig,
    pub profile: ProfileConfig,
    pub feed: FeedConfig,
    pub search: SearchConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            session: SessionConfig::default(),
            profile: ProfileConfig::default(),
            feed: FeedConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by the `SOUK_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) but reads variables through
    /// `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(url) = var(ENV_BASE_URL) {
            if url.starts_with("http://") || url.starts_with("https://") {
                config.transport.base_url = url.trim_end_matches('/').to_string();
            } else {
                warn!(var = ENV_BASE_URL, value = %url, "not an http(s) URL, using default");
            }
        }

        if let Some(path) = var(ENV_STORE_PATH) {
            config.store_path = PathBuf::from(path);
        }

        if let Some(secs) = var(ENV_TIMEOUT_SECS) {
            match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => config.transport.timeout = Duration::from_secs(secs),
                _ => warn!(var = ENV_TIMEOUT_SECS, value = %secs, "not a positive integer, using default"),
            }
        }

        if let Some(ttl) = var(ENV_TOKEN_TTL) {
            if is_compact_duration(&ttl) {
                config.session.token_expires_in = ttl;
            } else {
                warn!(var = ENV_TOKEN_TTL, value = %ttl, "not a duration like `1y` or `30d`, using default");
            }
        }

        config
    }
}

/// Accepts the backend's compact durations: digits then one unit letter.
fn is_compact_duration(text: &str) -> bool {
    let Some((unit_at, unit)) = text.char_indices().last() else {
        return false;
    };
    let digits = &text[..unit_at];
    matches!(unit, 's' | 'm' | 'h' | 'd' | 'w' | 'y')
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let cfg = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg.transport.base_url, souk_transport::DEFAULT_BASE_URL);
        assert_eq!(cfg.store_path, PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(cfg.session.token_expires_in, "1y");
        assert!(cfg.session.single_flight_refresh);
    }

    #[test]
    fn test_env_overrides() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "http://localhost:3000/api/"),
            (ENV_STORE_PATH, "/tmp/session.json"),
            (ENV_TIMEOUT_SECS, "5"),
            (ENV_TOKEN_TTL, "30d"),
        ]));
        assert_eq!(cfg.transport.base_url, "http://localhost:3000/api");
        assert_eq!(cfg.store_path, PathBuf::from("/tmp/session.json"));
        assert_eq!(cfg.transport.timeout, Duration::from_secs(5));
        assert_eq!(cfg.session.token_expires_in, "30d");
    }

    #[test]
    fn test_bad_values_keep_defaults() {
        let cfg = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, "localhost"),
            (ENV_TIMEOUT_SECS, "soon"),
            (ENV_TOKEN_TTL, "forever"),
            (ENV_STORE_PATH, "   "),
        ]));
        let default = ClientConfig::default();
        assert_eq!(cfg.transport.base_url, default.transport.base_url);
        assert_eq!(cfg.transport.timeout, default.transport.timeout);
        assert_eq!(cfg.session.token_expires_in, "1y");
        assert_eq!(cfg.store_path, default.store_path);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cfg = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "0")]));
        assert_eq!(cfg.transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_compact_duration() {
        for ok in ["1y", "30d", "12h", "90s"] {
            assert!(is_compact_duration(ok), "{ok}");
        }
        for bad in ["y", "1", "1.5d", "1x", "", "d1"] {
            assert!(!is_compact_duration(bad), "{bad}");
        }
    }
}
