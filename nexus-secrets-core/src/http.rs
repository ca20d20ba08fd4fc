use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::time::Duration;

const USER_AGENT: &str = concat!("nexus-secrets/", env!("CARGO_PKG_VERSION"));

/// Builder for the `reqwest` clients shared by the HTTP backends.
#[derive(Clone, Debug, Default)]
pub struct HttpBuilder {
    timeout: Option<Duration>,
    default_headers: HeaderMap,
}

impl HttpBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every request issued by the client, connect and body read included.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Attach a header to every request. Sensitive values are marked so they
    /// stay out of `Debug` output.
    pub fn header(mut self, name: &str, value: &str, sensitive: bool) -> Result<Self> {
        let header = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("invalid header name {name}"))?;
        let mut value = HeaderValue::from_str(value)
            .with_context(|| format!("invalid value for header {name}"))?;
        value.set_sensitive(sensitive);
        self.default_headers.insert(header, value);
        Ok(self)
    }

    pub fn build(self) -> Result<Client> {
        let mut builder = Client::builder()
            .use_rustls_tls()
            .user_agent(USER_AGENT)
            .default_headers(self.default_headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().context("failed to build HTTP client")
    }
}
