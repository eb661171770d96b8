use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, Response};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::auth::{AuthManager, TokenBundle};
use crate::error::ApiError;

const JSON: &str = "application/json";

/// Authenticated HTTP client for the DHL Parcel API with retry logic
pub struct DhlHttpClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// API root, without trailing slash
    base_url: String,

    /// Authentication manager
    auth_manager: Arc<AuthManager>,

    /// Bundle whose access token is attached to outgoing requests
    current: RwLock<Option<TokenBundle>>,

    /// Maximum number of retries
    max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    base_delay_ms: u64,
}

impl DhlHttpClient {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        auth_manager: Arc<AuthManager>,
        max_retries: u32,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_manager,
            current: RwLock::new(None),
            max_retries,
            base_delay_ms: 1000, // 1 second base delay
        }
    }

    /// Build the pooled reqwest client used for both auth and API calls
    pub fn build_client(connect_timeout: u64, request_timeout: u64) -> Result<Client> {
        Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout))
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")
    }

    pub fn auth_manager(&self) -> &Arc<AuthManager> {
        &self.auth_manager
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Access token for the next request.
    ///
    /// Authenticates only when no bundle is held or the held access token
    /// has expired.
    pub async fn bearer_token(&self) -> Result<String, ApiError> {
        if let Some(token) = Self::usable_token(self.current.read().await.as_ref()) {
            return Ok(token);
        }

        let mut current = self.current.write().await;
        // Another task may have authenticated while we waited for the lock
        if let Some(token) = Self::usable_token(current.as_ref()) {
            return Ok(token);
        }

        let bundle = self.auth_manager.authenticate().await?;
        let token = bundle.access_token.clone();
        *current = Some(bundle);
        Ok(token)
    }

    fn usable_token(bundle: Option<&TokenBundle>) -> Option<String> {
        bundle
            .filter(|b| !b.is_access_token_expired())
            .map(|b| b.access_token.clone())
    }

    /// Forget the held token so the next request authenticates again
    pub async fn invalidate_token(&self) {
        *self.current.write().await = None;
    }

    /// Absolute URL for an API path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET a JSON document
    pub async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, ApiError> {
        let response = self.send(Method::GET, path, query, None, JSON).await?;
        Self::read_json(response).await
    }

    /// POST a JSON body and read the JSON answer
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self.send(Method::POST, path, &[], Some(body), JSON).await?;
        Self::read_json(response).await
    }

    /// GET a binary document such as a PDF label
    pub async fn get_bytes(
        &self,
        path: &str,
        query: &[(String, String)],
        accept: &str,
    ) -> Result<Bytes, ApiError> {
        let response = self.send(Method::GET, path, query, None, accept).await?;
        let bytes = response
            .bytes()
            .await
            .context("Failed to read response body")?;
        Ok(bytes)
    }

    async fn read_json(response: Response) -> Result<Value, ApiError> {
        let text = response
            .text()
            .await
            .context("Failed to read response body")?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let value: Value = serde_json::from_str(&text).context("Response is not valid JSON")?;
        Ok(value)
    }

    /// Execute an authenticated request
    /// Automatically handles:
    /// - 401: re-authenticates once and retries
    /// - 429: exponential backoff
    /// - 5xx and network errors: exponential backoff, idempotent methods only
    ///
    /// A POST that may have reached the carrier is never sent twice.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
        accept: &str,
    ) -> Result<Response, ApiError> {
        let url = self.url(path);
        let mut attempt = 0;
        let mut reauthenticated = false;
        let idempotent = method.is_idempotent();

        tracing::debug!(
            method = %method,
            url = %url,
            "Sending HTTP request"
        );

        loop {
            let token = self.bearer_token().await?;

            let mut request = self
                .client
                .request(method.clone(), &url)
                .query(query)
                .header(ACCEPT, accept)
                .bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }

            tracing::debug!(
                attempt = attempt + 1,
                max_retries = self.max_retries,
                "Executing request attempt"
            );

            match request.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        tracing::debug!(status = %status, "Request successful");
                        return Ok(response);
                    }

                    match status.as_u16() {
                        // 401: token rejected, authenticate again and retry once
                        401 if !reauthenticated => {
                            tracing::warn!("Received 401, re-authenticating and retrying...");
                            self.invalidate_token().await;
                            reauthenticated = true;
                            continue;
                        }

                        // 429, or 5xx on an idempotent request: Exponential backoff
                        code @ (429 | 500..=599)
                            if (code == 429 || idempotent) && attempt < self.max_retries =>
                        {
                            let delay = self.calculate_backoff_delay(attempt);
                            tracing::warn!(
                                "Received {}, retrying after {}ms (attempt {}/{})",
                                status,
                                delay,
                                attempt + 1,
                                self.max_retries
                            );

                            tokio::time::sleep(Duration::from_millis(delay)).await;
                            attempt += 1;
                            continue;
                        }

                        _ => {}
                    }

                    // Non-retryable error or max retries exceeded
                    let error_text = response.text().await.unwrap_or_default();
                    tracing::error!(
                        status = status.as_u16(),
                        url = %url,
                        response_body = %error_text,
                        attempt = attempt + 1,
                        "HTTP request failed with error response"
                    );
                    return Err(ApiError::CarrierError {
                        status: status.as_u16(),
                        message: error_text,
                    });
                }

                Err(e) => {
                    let error_kind = if e.is_timeout() {
                        "timeout"
                    } else if e.is_connect() {
                        "connection_failed"
                    } else if e.is_request() {
                        "request_error"
                    } else if e.is_body() {
                        "body_error"
                    } else if e.is_decode() {
                        "decode_error"
                    } else {
                        "unknown"
                    };

                    // Network error - retry with backoff unless a POST may have landed
                    if (idempotent || e.is_connect()) && attempt < self.max_retries {
                        let delay = self.calculate_backoff_delay(attempt);
                        tracing::warn!(
                            error_kind = error_kind,
                            error = %e,
                            url = %url,
                            "Request failed, retrying after {}ms (attempt {}/{})",
                            delay,
                            attempt + 1,
                            self.max_retries
                        );

                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        attempt += 1;
                        continue;
                    }

                    tracing::error!(
                        error_kind = error_kind,
                        error = %e,
                        url = %url,
                        total_attempts = attempt + 1,
                        "HTTP request failed after all retries"
                    );

                    return Err(ApiError::Internal(anyhow::anyhow!(
                        "HTTP request failed: {} (kind: {})",
                        e,
                        error_kind
                    )));
                }
            }
        }
    }

    /// Calculate exponential backoff delay
    fn calculate_backoff_delay(&self, attempt: u32) -> u64 {
        // base_delay * 2^attempt plus up to 10% jitter
        let delay = self.base_delay_ms * 2_u64.pow(attempt);
        let jitter = (delay as f64 * 0.1 * rand::random::<f64>()) as u64;
        delay + jitter
    }
}
