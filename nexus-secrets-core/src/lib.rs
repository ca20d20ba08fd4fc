//! Secret resolution and role-based action checks for the Intent Nexus platform.

pub mod backend;
pub mod config;
pub mod errors;
pub mod http;
pub mod keys;
pub mod policy;
pub mod provider;
pub mod resolver;
mod rt;

pub use backend::{ProxyBackend, SecretBackend, VaultBackend};
pub use config::{ProxyConfig, ResolverConfig, VaultConfig};
pub use errors::{BackendError, BackendResult, PolicyError};
pub use policy::{Action, PermissionMatrix, Role, is_allowed};
pub use provider::BackendKind;
pub use resolver::SecretResolver;
