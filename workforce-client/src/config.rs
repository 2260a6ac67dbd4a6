//! Client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection settings for the workforce API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every resource path is appended to.
    pub base_url: String,
    /// Path of the client-credentials token endpoint.
    pub token_path: String,
    /// Header that carries the access token on resource requests.
    pub token_header: String,
    /// Per-request timeout (in seconds).
    pub request_timeout_secs: u64,
    /// How long layout catalogs stay in the response cache (in seconds).
    pub layout_cache_ttl_secs: u64,
    /// Token lifetime assumed when the provider omits `expire_in`.
    pub default_token_lifetime_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.kaonavi.jp/api/v2.0".to_string(),
            token_path: "/token".to_string(),
            token_header: "Kaonavi-Token".to_string(),
            request_timeout_secs: 60,
            layout_cache_ttl_secs: 3600,
            default_token_lifetime_secs: 3600,
        }
    }
}

impl ClientConfig {
    /// Full URL for a resource path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn token_url(&self) -> String {
        self.url(&self.token_path)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn layout_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.layout_cache_ttl_secs)
    }
}
