use std::fmt;
use std::str::FromStr;

/// Backend variants a resolver can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// HashiCorp Vault KV v2 over HTTP.
    #[default]
    Vault,
    /// The internal secrets proxy service.
    Proxy,
}

impl BackendKind {
    /// Parse a backend from its environment representation.
    pub fn from_env_value(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse().ok()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Vault => "vault",
            BackendKind::Proxy => "proxy",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "vault" | "kv" => Ok(BackendKind::Vault),
            "proxy" | "docker" | "secrets-docker" => Ok(BackendKind::Proxy),
            other => Err(format!("unknown secrets backend `{other}`")),
        }
    }
}
