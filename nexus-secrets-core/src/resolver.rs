use crate::backend::{ProxyBackend, SecretBackend, VaultBackend};
use crate::config::{MAX_ATTEMPTS_CAP, MAX_RETRY_DELAY, ResolverConfig};
use crate::errors::{BackendError, BackendResult};
use crate::provider::BackendKind;
use crate::rt;
use anyhow::Result;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Process-local secret cache in front of a single [`SecretBackend`].
///
/// A key is fetched from the backend at most once until [`clear`](Self::clear)
/// is called. Every backend failure resolves to `None`; the cause is only
/// visible in logs.
pub struct SecretResolver {
    backend: Arc<dyn SecretBackend>,
    cache: RwLock<HashMap<String, String>>,
    max_attempts: usize,
    retry_delay: Duration,
}

impl SecretResolver {
    /// Build a resolver around an explicit backend, with a single attempt per miss.
    pub fn new<B>(backend: B) -> Self
    where
        B: SecretBackend + 'static,
    {
        Self::from_backend(Arc::new(backend))
    }

    pub fn from_backend(backend: Arc<dyn SecretBackend>) -> Self {
        Self {
            backend,
            cache: RwLock::new(HashMap::new()),
            max_attempts: 1,
            retry_delay: Duration::ZERO,
        }
    }

    /// Build the backend selected by `config`.
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let backend: Arc<dyn SecretBackend> = match config.selected_backend() {
            BackendKind::Vault => Arc::new(VaultBackend::new(config.vault_config())?),
            BackendKind::Proxy => Arc::new(ProxyBackend::new(config.proxy_config())?),
        };
        info!(
            backend = backend.name(),
            max_attempts = config.attempts(),
            "secret resolver configured"
        );
        Ok(Self::from_backend(backend).with_retries(config.attempts(), config.delay()))
    }

    /// Build a resolver using environment configuration.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ResolverConfig::from_env())
    }

    /// Retry transport failures up to `max_attempts` total calls per miss.
    ///
    /// Attempts are clamped to `1..=5` and the base delay to five seconds,
    /// matching [`ResolverConfig`].
    pub fn with_retries(mut self, max_attempts: usize, delay: Duration) -> Self {
        self.max_attempts = max_attempts.clamp(1, MAX_ATTEMPTS_CAP);
        self.retry_delay = delay.min(MAX_RETRY_DELAY);
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Resolve `key`, serving from cache when possible.
    pub async fn resolve(&self, key: &str) -> Option<String> {
        if key.trim().is_empty() {
            warn!(backend = self.backend_name(), "refusing to resolve an empty secret key");
            return None;
        }

        let cached = self.read().get(key).cloned();
        if let Some(value) = cached {
            debug!(backend = self.backend_name(), key, "secret cache hit");
            return Some(value);
        }

        match self.fetch(key).await {
            Ok(value) => Some(self.store(key, value)),
            Err(err) => {
                self.log_failure(key, &err);
                None
            }
        }
    }

    /// Synchronous variant of [`resolve`](Self::resolve) for callers outside async code.
    ///
    /// Must not be called from a current-thread runtime; that case resolves to `None`.
    pub fn resolve_blocking(&self, key: &str) -> Option<String> {
        rt::sync_await(self.resolve(key)).flatten()
    }

    /// Evict every cached secret. The next resolution of any key hits the backend.
    pub fn clear(&self) {
        let mut cache = self.write();
        let evicted = cache.len();
        cache.clear();
        info!(backend = self.backend_name(), evicted, "secret cache cleared");
    }

    pub fn cached_len(&self) -> usize {
        self.read().len()
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    async fn fetch(&self, key: &str) -> BackendResult<String> {
        let mut attempt = 0usize;
        loop {
            attempt += 1;
            match self.backend.fetch(key).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= self.max_attempts || !err.is_transient() => {
                    return Err(err);
                }
                Err(err) => {
                    debug!(
                        backend = self.backend_name(),
                        key,
                        attempt,
                        error = %err,
                        "retrying secret fetch"
                    );
                    tokio::time::sleep(self.backoff(attempt)).await;
                }
            }
        }
    }

    /// Linear backoff, never longer than `MAX_RETRY_DELAY`.
    fn backoff(&self, attempt: usize) -> Duration {
        u32::try_from(attempt)
            .ok()
            .and_then(|factor| self.retry_delay.checked_mul(factor))
            .map_or(MAX_RETRY_DELAY, |delay| delay.min(MAX_RETRY_DELAY))
    }

    /// Insert unless another caller filled the slot first; the cached value wins.
    fn store(&self, key: &str, value: String) -> String {
        match self.write().entry(key.to_string()) {
            Entry::Occupied(existing) => {
                if *existing.get() != value {
                    warn!(
                        backend = self.backend_name(),
                        key,
                        "backend returned a different value for a cached key; keeping cached value"
                    );
                }
                existing.get().clone()
            }
            Entry::Vacant(slot) => slot.insert(value).clone(),
        }
    }

    fn log_failure(&self, key: &str, err: &BackendError) {
        match err {
            BackendError::NotFound { .. } => debug!(
                backend = self.backend_name(),
                key,
                kind = err.kind(),
                "secret not found"
            ),
            _ => warn!(
                backend = self.backend_name(),
                key,
                kind = err.kind(),
                error = %err,
                "secret resolution failed"
            ),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}
