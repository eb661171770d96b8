// Unauthenticated transport used by the auth exchanges

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::types::RawResponse;

/// Issues a plain JSON POST and hands back status and body untouched
#[async_trait]
pub trait AuthTransport: Send + Sync {
    async fn post_json(&self, url: &str, body: &Value) -> Result<RawResponse>;
}

/// [`AuthTransport`] over a shared reqwest client
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AuthTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<RawResponse> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to send authentication request to {}", url))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read authentication response body")?;

        Ok(RawResponse { status, body })
    }
}
