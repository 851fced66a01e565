// Signed HTTP Client
//
// Calls the payment API with a freshly signed token per request. When a
// body is present, the canonical string returned by the signer is sent as
// is; the original value is never serialized a second time.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{error, info};

use crate::config::ApiConfig;
use crate::signing::{RequestSigner, SigningIdentity};

/// Header carrying the API version on every request.
pub const API_VERSION_HEADER: &str = "X-Api-Version";

/// HTTP client for the payment API.
pub struct SignedApiClient {
    client: Client,
    base_url: String,
    api_version: String,
    identity: SigningIdentity,
    signer: RequestSigner,
}

impl SignedApiClient {
    /// Create a new client for `base_url`.
    pub fn new(
        base_url: &str,
        api_version: &str,
        identity: SigningIdentity,
        signer: RequestSigner,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            identity,
            signer,
        })
    }

    /// Create a client for the environment selected in `config`.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let identity = config.identity().context("failed to load partner identity")?;
        Self::new(
            config.base_url(),
            &config.api_version,
            identity,
            config.signer(),
            config.timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value> {
        self.request(Method::GET, path, query, None).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    /// Sign and send one request, returning the decoded JSON response.
    ///
    /// Empty responses come back as `Value::Null` and non-JSON responses as
    /// `Value::String`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        info!("🌐 Making {} request to: {}", method, url);

        let signed = self
            .signer
            .sign(&self.identity, body)
            .context("failed to sign request")?;

        let mut request_builder = self
            .client
            .request(method.clone(), &url)
            .header(AUTHORIZATION, format!("Bearer {}", signed.token))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(API_VERSION_HEADER, &self.api_version);

        if !query.is_empty() {
            request_builder = request_builder.query(query);
        }

        if let Some(canonical_body) = signed.canonical_body {
            request_builder = request_builder.body(canonical_body);
        }

        let response = request_builder
            .send()
            .await
            .with_context(|| format!("{} {} failed", method, url))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("❌ HTTP request failed with status {}: {}", status, error_text);
            return Err(anyhow!("HTTP request failed: {} - {}", status, error_text));
        }

        let text = response
            .text()
            .await
            .context("failed to read response body")?;
        info!("✅ HTTP request successful ({})", status);

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        match serde_json::from_str(&text) {
            Ok(json) => Ok(json),
            Err(_) => Ok(Value::String(text)),
        }
    }
}
