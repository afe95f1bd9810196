//! Capabilities the role-create adapter depends on.
//!
//! The adapter never talks to Vault directly: it authenticates through an
//! [`Authenticator`], asks a [`VaultClientProvider`] for a client and calls
//! [`DatabaseSecrets::create_role`] on it. Tests substitute doubles for any
//! of the three.

use crate::vault::{CreateRoleRequest, VaultError};
use async_trait::async_trait;
use serde_json::Value;

/// Failures raised while authenticating. The message is surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Bad or missing option values, or a rejected login.
    #[error("{0}")]
    Value(String),

    /// The requested capability is not available in this build.
    #[error("{0}")]
    NotImplemented(String),
}

/// Logs in to Vault and confirms the resulting identity.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&mut self) -> Result<(), AuthError>;

    async fn validate(&self) -> Result<(), AuthError>;

    /// Token to present on subsequent requests, if the method produced one.
    fn token(&self) -> Option<String>;
}

/// Operations on a database secrets engine.
#[async_trait]
pub trait DatabaseSecrets: Send + Sync {
    /// Creates or overwrites a role. The response body is returned as-is.
    async fn create_role(&self, request: &CreateRoleRequest) -> Result<Value, VaultError>;
}

/// Hands out configured clients.
pub trait VaultClientProvider: Send + Sync {
    type Client: DatabaseSecrets;

    fn vault_client(&self, token: Option<&str>) -> Result<Self::Client, VaultError>;
}
