//! Credential collaborator: short-lived recognition tokens.
//!
//! The long-lived API secret stays on a trusted backend; this process asks it
//! for a one-shot token on every connect and never persists the result.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("token request failed: {0}")]
pub struct TokenError(pub String);

#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    async fn fetch_token(&self) -> Result<String, TokenError>;
}

#[derive(Debug, Deserialize)]
struct KeyResponse {
    key: String,
}

/// Fetches `{ "key": "<token>" }` from the trusted key endpoint
pub struct HttpTokenProvider {
    client: reqwest::Client,
    key_url: String,
}

impl HttpTokenProvider {
    pub fn new(key_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            key_url,
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for HttpTokenProvider {
    async fn fetch_token(&self) -> Result<String, TokenError> {
        let response = self
            .client
            .get(&self.key_url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| TokenError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TokenError(format!("key endpoint returned {status}")));
        }

        let body: KeyResponse = response
            .json()
            .await
            .map_err(|e| TokenError(e.to_string()))?;

        if body.key.is_empty() {
            return Err(TokenError("key endpoint returned an empty key".into()));
        }

        Ok(body.key)
    }
}

/// Fixed token, for tests and local development against self-hosted engines
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn fetch_token(&self) -> Result<String, TokenError> {
        Ok(self.token.clone())
    }
}
