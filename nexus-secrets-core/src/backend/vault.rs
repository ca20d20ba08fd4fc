//! HashiCorp Vault KV v2 read path.
//!
//! Secrets are read from `{addr}/v1/{mount}/data/{key}` and the value is taken
//! from the nested `data.data.value` field of the response envelope.

use super::{SecretBackend, decode_response, require_value};
use crate::config::VaultConfig;
use crate::errors::{BackendError, BackendResult};
use crate::http::HttpBuilder;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

const NAME: &str = "vault";

#[derive(Clone, Debug)]
pub struct VaultBackend {
    base: Url,
    kv_mount: String,
    client: Client,
}

impl VaultBackend {
    /// Build the backend, attaching the token (and namespace) headers to the client.
    pub fn new(config: &VaultConfig) -> Result<Self> {
        let base = Url::parse(&config.addr)
            .with_context(|| format!("VAULT_ADDR is not a valid URL: {}", config.addr))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("VAULT_ADDR is not a base URL: {}", config.addr);
        }

        let mut http = HttpBuilder::new()
            .timeout(config.timeout)
            .header("x-vault-token", &config.token, true)?;
        if let Some(namespace) = &config.namespace {
            http = http.header("x-vault-namespace", namespace, false)?;
        }

        Ok(Self {
            base,
            kv_mount: config.kv_mount.trim_matches('/').to_string(),
            client: http.build().context("failed to build Vault HTTP client")?,
        })
    }

    /// Each `/`-separated part of the key becomes one percent-encoded path
    /// segment, so `#` or `?` inside a key can never address another secret.
    fn data_url(&self, key: &str) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // `new` rejects cannot-be-a-base addresses, so the segments are always editable.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push("v1")
                .extend(self.kv_mount.split('/'))
                .push("data")
                .extend(key.trim_matches('/').split('/'));
        }
        url
    }
}

#[async_trait]
impl SecretBackend for VaultBackend {
    async fn fetch(&self, key: &str) -> BackendResult<String> {
        let response = self
            .client
            .get(self.data_url(key))
            .send()
            .await
            .map_err(|source| BackendError::Unreachable {
                backend: NAME,
                source,
            })?;
        let parsed: KvReadResponse = decode_response(NAME, response).await?;
        let value = parsed
            .data
            .and_then(|envelope| envelope.data)
            .and_then(|data| data.value);
        require_value(NAME, value)
    }

    fn name(&self) -> &'static str {
        NAME
    }
}

#[derive(Deserialize)]
struct KvReadResponse {
    #[serde(default)]
    data: Option<KvDataEnvelope>,
}

#[derive(Deserialize)]
struct KvDataEnvelope {
    #[serde(default)]
    data: Option<KvSecretData>,
}

#[derive(Deserialize)]
struct KvSecretData {
    #[serde(default)]
    value: Option<String>,
}
