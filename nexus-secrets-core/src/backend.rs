//! Backends answer "what is the value for key X" over their own wire format.

pub mod proxy;
pub mod vault;

use crate::errors::{BackendError, BackendResult};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;

pub use proxy::ProxyBackend;
pub use vault::VaultBackend;

/// Capability to fetch a single secret value by key.
///
/// Implementations apply their own bounded timeout. A missing or empty value
/// is reported as [`BackendError::NotFound`].
#[async_trait]
pub trait SecretBackend: Send + Sync {
    async fn fetch(&self, key: &str) -> BackendResult<String>;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T> SecretBackend for Box<T>
where
    T: SecretBackend + ?Sized,
{
    async fn fetch(&self, key: &str) -> BackendResult<String> {
        (**self).fetch(key).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[async_trait]
impl<T> SecretBackend for Arc<T>
where
    T: SecretBackend + ?Sized,
{
    async fn fetch(&self, key: &str) -> BackendResult<String> {
        (**self).fetch(key).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Map the status line and body of a backend response onto the shared
/// failure taxonomy, decoding 2xx bodies as `T`.
pub(crate) async fn decode_response<T: DeserializeOwned>(
    backend: &'static str,
    response: Response,
) -> BackendResult<T> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(BackendError::NotFound { backend });
    }
    if !status.is_success() {
        return Err(BackendError::Rejected {
            backend,
            status: status.as_u16(),
        });
    }
    let body = response
        .text()
        .await
        .map_err(|source| BackendError::Unreachable { backend, source })?;
    serde_json::from_str(&body).map_err(|err| BackendError::malformed(backend, err.to_string()))
}

/// Treat an absent or empty value as "not found".
pub(crate) fn require_value(backend: &'static str, value: Option<String>) -> BackendResult<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(BackendError::NotFound { backend }),
    }
}
