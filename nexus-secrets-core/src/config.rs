use crate::provider::BackendKind;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_VAULT_ADDR: &str = "http://localhost:8200";
pub const DEFAULT_VAULT_TOKEN: &str = "root";
pub const DEFAULT_KV_MOUNT: &str = "secret";
pub const DEFAULT_PROXY_URL: &str = "http://secrets-docker:8000/get-secret";

const DEFAULT_VAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_PROXY_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);
pub(crate) const MAX_ATTEMPTS_CAP: usize = 5;
pub(crate) const MAX_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Connection settings for the Vault KV v2 backend.
#[derive(Clone)]
pub struct VaultConfig {
    pub addr: String,
    pub token: String,
    pub namespace: Option<String>,
    pub kv_mount: String,
    pub timeout: Duration,
}

impl VaultConfig {
    /// Load settings from the environment.
    ///
    /// * `VAULT_ADDR` (default `http://localhost:8200`)
    /// * `VAULT_TOKEN` (default `root`)
    /// * `VAULT_NAMESPACE` (optional)
    /// * `VAULT_KV_MOUNT` (default `secret`)
    /// * `VAULT_HTTP_TIMEOUT_SECS` (default 15)
    pub fn from_env() -> Self {
        Self {
            addr: env_string("VAULT_ADDR").unwrap_or_else(|| DEFAULT_VAULT_ADDR.to_string()),
            token: env_string("VAULT_TOKEN").unwrap_or_else(|| DEFAULT_VAULT_TOKEN.to_string()),
            namespace: env_string("VAULT_NAMESPACE"),
            kv_mount: env_string("VAULT_KV_MOUNT").unwrap_or_else(|| DEFAULT_KV_MOUNT.to_string()),
            timeout: env_secs("VAULT_HTTP_TIMEOUT_SECS").unwrap_or(DEFAULT_VAULT_TIMEOUT),
        }
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_VAULT_ADDR.to_string(),
            token: DEFAULT_VAULT_TOKEN.to_string(),
            namespace: None,
            kv_mount: DEFAULT_KV_MOUNT.to_string(),
            timeout: DEFAULT_VAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultConfig")
            .field("addr", &self.addr)
            .field("token", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("kv_mount", &self.kv_mount)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Connection settings for the secrets proxy backend.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub url: String,
    pub timeout: Duration,
}

impl ProxyConfig {
    /// * `SECRETS_PROXY_URL` (default `http://secrets-docker:8000/get-secret`)
    /// * `SECRETS_PROXY_TIMEOUT_SECS` (default 10)
    pub fn from_env() -> Self {
        Self {
            url: env_string("SECRETS_PROXY_URL").unwrap_or_else(|| DEFAULT_PROXY_URL.to_string()),
            timeout: env_secs("SECRETS_PROXY_TIMEOUT_SECS").unwrap_or(DEFAULT_PROXY_TIMEOUT),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PROXY_URL.to_string(),
            timeout: DEFAULT_PROXY_TIMEOUT,
        }
    }
}

/// High-level configuration for [`SecretResolver`](crate::resolver::SecretResolver).
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    backend: BackendKind,
    vault: VaultConfig,
    proxy: ProxyConfig,
    max_attempts: usize,
    retry_delay: Duration,
}

impl ResolverConfig {
    /// Configuration with built-in defaults (Vault backend, single attempt).
    pub fn new() -> Self {
        Self {
            backend: BackendKind::default(),
            vault: VaultConfig::default(),
            proxy: ProxyConfig::default(),
            max_attempts: 1,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// * `NEXUS_SECRETS_BACKEND` selects the backend (`vault`, `proxy`).
    /// * `NEXUS_SECRETS_MAX_ATTEMPTS` enables capped retries on transport failures.
    /// * Backend settings come from [`VaultConfig::from_env`] and [`ProxyConfig::from_env`].
    pub fn from_env() -> Self {
        let mut config = ResolverConfig::new();

        if let Some(value) = env_string("NEXUS_SECRETS_BACKEND") {
            match BackendKind::from_env_value(&value) {
                Some(kind) => config.backend = kind,
                None => tracing::warn!(
                    value = %value,
                    "ignoring unknown NEXUS_SECRETS_BACKEND; using {}",
                    config.backend
                ),
            }
        }

        if let Some(attempts) =
            env_string("NEXUS_SECRETS_MAX_ATTEMPTS").and_then(|value| value.parse::<usize>().ok())
        {
            config = config.max_attempts(attempts);
        }

        config.vault = VaultConfig::from_env();
        config.proxy = ProxyConfig::from_env();
        config
    }

    /// Override the backend selection.
    pub fn backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn vault_addr(mut self, addr: impl Into<String>) -> Self {
        self.vault.addr = addr.into();
        self
    }

    pub fn vault_token(mut self, token: impl Into<String>) -> Self {
        self.vault.token = token.into();
        self
    }

    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy.url = url.into();
        self
    }

    /// Apply the same request timeout to both backends.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.vault.timeout = timeout;
        self.proxy.timeout = timeout;
        self
    }

    /// Total attempts per resolution, clamped to `1..=5`.
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.clamp(1, MAX_ATTEMPTS_CAP);
        self
    }

    /// Base delay between attempts; attempt `n` waits `n * delay`.
    /// Both the base and each computed wait are capped at five seconds.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay.min(MAX_RETRY_DELAY);
        self
    }

    pub fn selected_backend(&self) -> BackendKind {
        self.backend
    }

    pub fn vault_config(&self) -> &VaultConfig {
        &self.vault
    }

    pub fn proxy_config(&self) -> &ProxyConfig {
        &self.proxy
    }

    pub fn attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.retry_delay
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig::new()
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_secs(name: &str) -> Option<Duration> {
    env_string(name)
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .map(Duration::from_secs)
}
