//! Internal secrets proxy: a single `POST {"key": ...}` answered with `{"value": ...}`.

use super::{SecretBackend, decode_response, require_value};
use crate::config::ProxyConfig;
use crate::errors::{BackendError, BackendResult};
use crate::http::HttpBuilder;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

const NAME: &str = "proxy";

#[derive(Clone, Debug)]
pub struct ProxyBackend {
    url: Url,
    client: Client,
}

impl ProxyBackend {
    pub fn new(config: &ProxyConfig) -> Result<Self> {
        let url = Url::parse(&config.url)
            .with_context(|| format!("SECRETS_PROXY_URL is not a valid URL: {}", config.url))?;
        let client = HttpBuilder::new()
            .timeout(config.timeout)
            .build()
            .context("failed to build secrets proxy HTTP client")?;
        Ok(Self { url, client })
    }
}

#[async_trait]
impl SecretBackend for ProxyBackend {
    async fn fetch(&self, key: &str) -> BackendResult<String> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&SecretRequest { key })
            .send()
            .await
            .map_err(|source| BackendError::Unreachable {
                backend: NAME,
                source,
            })?;
        let parsed: SecretResponse = decode_response(NAME, response).await?;
        require_value(NAME, parsed.value)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[derive(Serialize)]
struct SecretRequest<'a> {
    key: &'a str,
}

#[derive(Deserialize)]
struct SecretResponse {
    #[serde(default)]
    value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn request_body_is_flat_key() {
        let body = serde_json::to_value(SecretRequest { key: "GITLAB_TOKEN" }).unwrap();
        assert_eq!(body, serde_json::json!({ "key": "GITLAB_TOKEN" }));
    }

    #[test]
    fn rejects_invalid_url() {
        let err = ProxyBackend::new(&ProxyConfig {
            url: "/get-secret".into(),
            timeout: Duration::from_secs(1),
        })
        .unwrap_err();
        assert!(err.to_string().contains("SECRETS_PROXY_URL"));
    }
}
