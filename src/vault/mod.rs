//! Vault module for the vault-db-role library
//!
//! This module implements the transport and API calls used against
//! HashiCorp Vault: the HTTP client, response classification, the
//! authenticator and the database secrets engine role call.
//!
//! ## Testing strategy:
//! - Each module contains its own unit tests within a `#[cfg(test)] mod tests` block
//! - HTTP behaviour is exercised against `wiremock` servers
//! - Integration tests in the `tests/` directory run the adapter end to end,
//!   optionally against a dev-mode Vault container

pub mod auth;
pub mod client;
pub mod common;
pub mod database;
pub mod error;

// Re-export key types and traits for convenience
pub use auth::VaultAuthenticator;
pub use client::VaultClient;
pub use database::{CreateRoleRequest, DatabaseEngine, HttpClientProvider};
pub use error::VaultError;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Vault connection configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct VaultConfig {
    /// Vault API URL, e.g., "http://127.0.0.1:8200".
    pub url: String,
    /// Optional CA certificate for verifying the server
    pub ca_cert_path: Option<String>,
    /// Optional namespace for supporting namespaced Vault instances (enterprise)
    pub namespace: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Whether to verify the server's TLS certificate
    pub validate_certs: bool,
}

impl VaultConfig {
    /// Create a new Vault config
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            ..Self::default()
        }
    }

    /// Set namespace
    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// Set CA bundle path
    pub fn with_ca_cert(mut self, path: &str) -> Self {
        self.ca_cert_path = Some(path.to_string());
        self
    }
}

// Default configuration
impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8200".to_string(),
            ca_cert_path: None,
            namespace: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            validate_certs: true,
        }
    }
}
