//! Database secrets engine operations for Vault.
//!
//! Only role creation is needed: a role ties a configured database
//! connection to the SQL templates Vault runs when it issues, renews or
//! revokes credentials.

use crate::interface::{DatabaseSecrets, VaultClientProvider};
use crate::params::RoleSpec;
use crate::vault::common::{
    mount_or_default, mount_segments, path_segment, DEFAULT_DATABASE_MOUNT,
};
use crate::vault::{VaultClient, VaultConfig, VaultError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Arguments of a create-role call.
///
/// All nine fields are always present. Optional values stay `None` and are
/// written to the request body as `null`, never dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRoleRequest {
    /// Role name; part of the request path.
    #[serde(skip)]
    pub name: String,
    pub db_name: String,
    pub creation_statements: Vec<String>,
    pub revocation_statements: Option<Vec<String>>,
    pub rollback_statements: Option<Vec<String>>,
    pub renew_statements: Option<Vec<String>>,
    pub default_ttl: Option<u64>,
    pub max_ttl: Option<u64>,
    /// Engine mount; part of the request path. `None` selects `database`.
    #[serde(skip)]
    pub mount_point: Option<String>,
}

impl CreateRoleRequest {
    pub fn from_args(role: &RoleSpec, mount_point: Option<&str>) -> Self {
        Self {
            name: role.role_name.clone(),
            db_name: role.connection_name.clone(),
            creation_statements: role.creation_statements.clone(),
            revocation_statements: role.revocation_statements.clone(),
            rollback_statements: role.rollback_statements.clone(),
            renew_statements: role.renew_statements.clone(),
            default_ttl: role.default_ttl,
            max_ttl: role.max_ttl,
            mount_point: mount_point.map(str::to_string),
        }
    }

    /// Mount the request targets, with Vault's default applied.
    pub fn effective_mount(&self) -> &str {
        mount_or_default(self.mount_point.as_deref(), DEFAULT_DATABASE_MOUNT)
    }

    /// API path of the role, `/v1/<mount>/roles/<name>`, with every segment
    /// percent-encoded. Fails on empty or dot segments.
    pub fn api_path(&self) -> Result<String, VaultError> {
        let mut segments = vec!["v1".to_string()];
        segments.extend(mount_segments(self.effective_mount())?);
        segments.push("roles".to_string());
        segments.push(path_segment(&self.name)?);
        Ok(format!("/{}", segments.join("/")))
    }

    pub fn body(&self) -> Result<Value, VaultError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// `DatabaseSecrets` over the Vault HTTP API.
#[derive(Debug, Clone)]
pub struct DatabaseEngine {
    client: VaultClient,
}

impl DatabaseEngine {
    pub fn new(client: VaultClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DatabaseSecrets for DatabaseEngine {
    async fn create_role(&self, request: &CreateRoleRequest) -> Result<Value, VaultError> {
        let path = request.api_path()?;
        info!(
            "Writing database role '{}' at mount '{}'",
            request.name,
            request.effective_mount()
        );
        let response = self.client.post_with_body(&path, request.body()?).await?;
        debug!("Role '{}' written", request.name);
        Ok(response)
    }
}

/// Builds `DatabaseEngine` clients from a fixed connection config.
#[derive(Debug, Clone)]
pub struct HttpClientProvider {
    config: VaultConfig,
}

impl HttpClientProvider {
    pub fn new(config: VaultConfig) -> Self {
        Self { config }
    }
}

impl VaultClientProvider for HttpClientProvider {
    type Client = DatabaseEngine;

    fn vault_client(&self, token: Option<&str>) -> Result<DatabaseEngine, VaultError> {
        VaultClient::from_config(&self.config, token).map(DatabaseEngine::new)
    }
}
