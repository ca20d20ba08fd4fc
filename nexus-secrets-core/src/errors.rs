use thiserror::Error;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Failures a [`SecretBackend`](crate::backend::SecretBackend) can report for a single fetch.
///
/// The resolver logs these and collapses them to an absent value; callers of
/// [`SecretResolver::resolve`](crate::resolver::SecretResolver::resolve) never see them.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend} backend unreachable: {source}")]
    Unreachable {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{backend} backend rejected the request with status {status}")]
    Rejected { backend: &'static str, status: u16 },
    #[error("{backend} backend returned a malformed response: {reason}")]
    MalformedResponse {
        backend: &'static str,
        reason: String,
    },
    #[error("secret not found in {backend} backend")]
    NotFound { backend: &'static str },
}

impl BackendError {
    /// Stable label used as the `kind` field in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Unreachable { .. } => "backend_unreachable",
            BackendError::Rejected { .. } => "backend_rejected",
            BackendError::MalformedResponse { .. } => "backend_malformed_response",
            BackendError::NotFound { .. } => "secret_not_found",
        }
    }

    /// Transport-level failures are the only ones worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Unreachable { .. })
    }

    pub(crate) fn malformed(backend: &'static str, reason: impl Into<String>) -> Self {
        BackendError::MalformedResponse {
            backend,
            reason: reason.into(),
        }
    }
}

/// Errors raised while building a custom [`PermissionMatrix`](crate::policy::PermissionMatrix).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("role {upper} must allow every action granted to {lower}; missing {action}")]
    NotHierarchical {
        upper: &'static str,
        lower: &'static str,
        action: &'static str,
    },
}
