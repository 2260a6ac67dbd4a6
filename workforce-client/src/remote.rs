//! HTTP implementation of [`WorkforceApi`].

use crate::cache::{ResponseCache, MEMBER_LAYOUTS_KEY, SHEET_LAYOUTS_KEY};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::source::WorkforceApi;
use crate::token::{AccessToken, CredentialCache};
use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a request stands in its authentication retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Retry,
}

/// Authenticated client for the workforce API.
pub struct RemoteSource {
    config: ClientConfig,
    client: Client,
    credentials: Arc<CredentialCache>,
    cache: Arc<ResponseCache>,
}

impl RemoteSource {
    pub fn new(
        config: ClientConfig,
        credentials: Arc<CredentialCache>,
        cache: Arc<ResponseCache>,
    ) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            credentials,
            cache,
        })
    }

    pub fn credentials(&self) -> &Arc<CredentialCache> {
        &self.credentials
    }

    /// Sends an authenticated request and returns the parsed JSON body.
    ///
    /// A 401 invalidates the cached token and the request is sent once more
    /// with a fresh one. Every other non-2xx status fails immediately.
    pub async fn fetch(&self, path: &str, method: Method, body: Option<&Value>) -> ClientResult<Value> {
        let mut token = self.credentials.get_token().await?;
        let mut attempt = Attempt::Initial;

        loop {
            let response = self.send(path, method.clone(), body, &token).await?;
            let status = response.status();

            if status.is_success() {
                return Self::parse_body(path, response).await;
            }

            let error_body = response.text().await.unwrap_or_default();
            match attempt {
                Attempt::Initial if status == StatusCode::UNAUTHORIZED => {
                    warn!("Token rejected on {}, renewing and retrying once", path);
                    token = self.credentials.renew(&token).await?;
                    attempt = Attempt::Retry;
                }
                _ => {
                    return Err(ClientError::RemoteRequest {
                        path: path.to_string(),
                        status: status.as_u16(),
                        body: error_body,
                    });
                }
            }
        }
    }

    /// GET shorthand for [`fetch`](Self::fetch).
    pub async fn get(&self, path: &str) -> ClientResult<Value> {
        self.fetch(path, Method::GET, None).await
    }

    async fn send(
        &self,
        path: &str,
        method: Method,
        body: Option<&Value>,
        token: &AccessToken,
    ) -> ClientResult<Response> {
        debug!("{} {}", method, path);

        let mut request = self
            .client
            .request(method.clone(), self.config.url(path))
            .header(self.config.token_header.as_str(), token.value.as_str());

        if let Some(body) = body.filter(|_| method != Method::GET) {
            request = request.json(body);
        }

        request
            .send()
            .await
            .map_err(|e| ClientError::Network(format!("request to {path} failed: {e}")))
    }

    async fn parse_body(path: &str, response: Response) -> ClientResult<Value> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(format!("failed to read body of {path}: {e}")))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Serves `key` from the response cache, fetching `path` on a miss.
    async fn cached_get(&self, key: &str, path: &str) -> ClientResult<Value> {
        if let Some(value) = self.cache.get(key).await {
            return Ok(value);
        }

        let value = self.get(path).await?;
        self.cache
            .put(key, value.clone(), self.config.layout_cache_ttl())
            .await;
        Ok(value)
    }
}

#[async_trait]
impl WorkforceApi for RemoteSource {
    async fn member_layouts(&self) -> ClientResult<Value> {
        self.cached_get(MEMBER_LAYOUTS_KEY, "/member_layouts").await
    }

    async fn members(&self) -> ClientResult<Value> {
        self.get("/members").await
    }

    async fn sheet_layouts(&self) -> ClientResult<Value> {
        self.cached_get(SHEET_LAYOUTS_KEY, "/sheet_layouts").await
    }

    async fn sheet(&self, sheet_id: &str) -> ClientResult<Value> {
        self.get(&format!("/sheets/{sheet_id}")).await
    }
}
