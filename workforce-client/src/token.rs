//! Access-token acquisition and caching.
//!
//! [`CredentialCache`] holds at most one live [`AccessToken`]. Reads share a
//! `RwLock`; acquiring a new token is serialized behind a separate mutex so
//! concurrent rejections cannot race each other into overwriting the cache
//! with a stale token.

use crate::config::ClientConfig;
use crate::credential::{Credential, CredentialStore};
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

/// Seconds shaved off the provider's stated expiry.
pub const EXPIRY_MARGIN_SECS: u64 = 300;
/// Shortest time a token is kept, whatever the provider reports.
pub const MIN_CACHE_SECS: u64 = 300;
/// Longest time a token is kept, whatever the provider reports.
pub const MAX_CACHE_SECS: u64 = 24 * 60 * 60;

/// How long a token with the given provider expiry stays cached.
pub fn cache_lifetime(expire_in_secs: u64) -> Duration {
    Duration::from_secs(
        expire_in_secs
            .saturating_sub(EXPIRY_MARGIN_SECS)
            .clamp(MIN_CACHE_SECS, MAX_CACHE_SECS),
    )
}

/// A bearer token and the instant the cache stops trusting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: Instant,
}

impl AccessToken {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// What the token endpoint handed back.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    /// Provider expiry in seconds. Numeric strings and floats are accepted;
    /// zero or anything unreadable counts as missing.
    #[serde(default, deserialize_with = "lenient_secs")]
    pub expire_in: Option<u64>,
}

fn lenient_secs<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(secs_from_value).filter(|secs| *secs > 0))
}

fn secs_from_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(secs_from_float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(secs_from_float))
        }
        _ => None,
    }
}

fn secs_from_float(f: f64) -> Option<u64> {
    // `as` saturates at u64::MAX; the cache lifetime is clamped anyway.
    (f.is_finite() && f > 0.0).then(|| f as u64)
}

/// Exchanges a credential for a token grant.
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self, credential: &Credential) -> ClientResult<TokenGrant>;
}

/// Client-credentials exchange against the HTTP token endpoint.
pub struct HttpTokenExchange {
    client: Client,
    token_url: String,
}

impl HttpTokenExchange {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            token_url: config.token_url(),
        })
    }
}

#[async_trait]
impl TokenExchange for HttpTokenExchange {
    async fn exchange(&self, credential: &Credential) -> ClientResult<TokenGrant> {
        debug!("Exchanging consumer credential for access token");

        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&credential.key, Some(&credential.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ClientError::Authentication(format!("token exchange failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Authentication(format!(
                "token exchange rejected ({}): {body}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::Authentication(format!("failed to parse token response: {e}")))
    }
}

/// Time-boxed cache of the acting user's access token.
pub struct CredentialCache {
    store: Arc<dyn CredentialStore>,
    exchange: Arc<dyn TokenExchange>,
    default_lifetime_secs: u64,
    token: RwLock<Option<AccessToken>>,
    renewal: Mutex<()>,
}

impl CredentialCache {
    pub fn new(store: Arc<dyn CredentialStore>, exchange: Arc<dyn TokenExchange>) -> Self {
        Self {
            store,
            exchange,
            default_lifetime_secs: ClientConfig::default().default_token_lifetime_secs,
            token: RwLock::new(None),
            renewal: Mutex::new(()),
        }
    }

    /// Builds a cache that talks to the configured HTTP token endpoint.
    pub fn from_config(config: &ClientConfig, store: Arc<dyn CredentialStore>) -> ClientResult<Self> {
        let exchange = Arc::new(HttpTokenExchange::new(config)?);
        Ok(Self::new(store, exchange).with_default_lifetime(config.default_token_lifetime_secs))
    }

    /// Lifetime assumed when the provider does not report one.
    pub fn with_default_lifetime(mut self, secs: u64) -> Self {
        self.default_lifetime_secs = secs;
        self
    }

    /// Returns the cached token, acquiring a new one if none is live.
    pub async fn get_token(&self) -> ClientResult<AccessToken> {
        if let Some(token) = self.live_token().await {
            return Ok(token);
        }

        let _renewal = self.renewal.lock().await;
        // Another caller may have finished a renewal while we waited.
        if let Some(token) = self.live_token().await {
            return Ok(token);
        }
        self.authenticate_stored().await
    }

    /// Drops the cached token. No-op if nothing is cached.
    pub async fn invalidate(&self) {
        if self.token.write().await.take().is_some() {
            debug!("Access token invalidated");
        }
    }

    /// Exchanges `credential` for a fresh token and caches it.
    pub async fn authenticate(&self, credential: &Credential) -> ClientResult<AccessToken> {
        let _renewal = self.renewal.lock().await;
        self.authenticate_locked(credential).await
    }

    /// Replaces a token the server rejected.
    ///
    /// If a concurrent caller already swapped `rejected` for a newer live
    /// token, that token is returned instead of exchanging again.
    pub async fn renew(&self, rejected: &AccessToken) -> ClientResult<AccessToken> {
        let _renewal = self.renewal.lock().await;

        if let Some(current) = self.live_token().await {
            if current.value != rejected.value {
                debug!("Access token already renewed by another request");
                return Ok(current);
            }
        }

        self.invalidate().await;
        self.authenticate_stored().await
    }

    /// True if a live token is cached.
    pub async fn has_token(&self) -> bool {
        self.live_token().await.is_some()
    }

    async fn live_token(&self) -> Option<AccessToken> {
        let guard = self.token.read().await;
        guard.as_ref().filter(|t| !t.is_expired()).cloned()
    }

    async fn authenticate_stored(&self) -> ClientResult<AccessToken> {
        let credential = self
            .store
            .get()
            .ok_or_else(|| ClientError::Authentication("no credential configured".to_string()))?;
        self.authenticate_locked(&credential).await
    }

    async fn authenticate_locked(&self, credential: &Credential) -> ClientResult<AccessToken> {
        if !credential.is_complete() {
            return Err(ClientError::Authentication(
                "consumer key and secret are both required".to_string(),
            ));
        }

        let grant = self.exchange.exchange(credential).await?;
        let lifetime = cache_lifetime(grant.expire_in.unwrap_or(self.default_lifetime_secs));
        let token = AccessToken {
            value: grant.access_token,
            expires_at: Instant::now() + lifetime,
        };

        *self.token.write().await = Some(token.clone());
        info!("Access token acquired, cached for {}s", lifetime.as_secs());

        Ok(token)
    }
}
