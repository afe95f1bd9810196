//! Shared fixtures for the integration tests: sample module arguments,
//! test doubles for the injected capabilities, and an opt-in dev-mode Vault
//! container.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use testcontainers::core::{IntoContainerPort, WaitFor};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, GenericImage, ImageExt};
use vault_db_role::vault::{CreateRoleRequest, VaultError};
use vault_db_role::{AuthError, Authenticator, DatabaseSecrets, VaultClientProvider};

/// Set up logging for tests
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

pub fn connection_options() -> Value {
    json!({
        "auth_method": "token",
        "url": "http://myvault",
        "token": "beep-boop",
    })
}

pub fn sample_role() -> Value {
    json!({
        "role_name": "foo",
        "connection_name": "bar",
        "creation_statements": [
            "CREATE ROLE \"{{name}}\" WITH LOGIN PASSWORD '{{password}}' VALID UNTIL '{{expiration}}';",
            "GRANT SELECT ON ALL TABLES IN SCHEMA public TO \"{{name}}\";"
        ],
        "default_ttl": 3600,
        "max_ttl": 86400,
    })
}

/// Connection options, `engine_mount_point: dbmount`, the sample role, then
/// `overrides` on top.
pub fn combined_options(overrides: Value) -> Value {
    let mut options = connection_options();
    let target = options.as_object_mut().unwrap();
    target.insert("engine_mount_point".into(), json!("dbmount"));
    for source in [sample_role(), overrides] {
        if let Value::Object(map) = source {
            target.extend(map);
        }
    }
    options
}

/// Authenticator double. Each step fails with the configured error, if any.
#[derive(Default)]
pub struct FakeAuthenticator {
    pub authenticate_error: Option<AuthError>,
    pub validate_error: Option<AuthError>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeAuthenticator {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Authenticator for FakeAuthenticator {
    async fn authenticate(&mut self) -> Result<(), AuthError> {
        self.calls.lock().unwrap().push("authenticate");
        match &self.authenticate_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    async fn validate(&self) -> Result<(), AuthError> {
        self.calls.lock().unwrap().push("validate");
        match &self.validate_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn token(&self) -> Option<String> {
        Some("beep-boop".to_string())
    }
}

/// Records every create-role call and answers with a canned response.
#[derive(Default)]
pub struct FakeDatabase {
    pub calls: Mutex<Vec<CreateRoleRequest>>,
    error: Mutex<Option<VaultError>>,
}

impl FakeDatabase {
    pub fn failing_with(error: VaultError) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            error: Mutex::new(Some(error)),
        }
    }

    pub fn calls(&self) -> Vec<CreateRoleRequest> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct FakeClient(Arc<FakeDatabase>);

#[async_trait]
impl DatabaseSecrets for FakeClient {
    async fn create_role(&self, request: &CreateRoleRequest) -> Result<Value, VaultError> {
        self.0.calls.lock().unwrap().push(request.clone());
        match self.0.error.lock().unwrap().take() {
            Some(e) => Err(e),
            // The response body is ignored by the adapter.
            None => Ok(json!({})),
        }
    }
}

/// Client accessor double handing out clients bound to one `FakeDatabase`.
#[derive(Default)]
pub struct FakeProvider {
    pub database: Arc<FakeDatabase>,
    pub tokens: Mutex<Vec<Option<String>>>,
}

impl FakeProvider {
    pub fn new(database: FakeDatabase) -> Self {
        Self {
            database: Arc::new(database),
            tokens: Mutex::new(Vec::new()),
        }
    }
}

impl VaultClientProvider for FakeProvider {
    type Client = FakeClient;

    fn vault_client(&self, token: Option<&str>) -> Result<FakeClient, VaultError> {
        self.tokens.lock().unwrap().push(token.map(str::to_string));
        Ok(FakeClient(Arc::clone(&self.database)))
    }
}

/// Whether tests needing Docker should run.
pub fn integration_enabled() -> bool {
    std::env::var("VAULT_DB_ROLE_RUN_INTEGRATION_TESTS").is_ok_and(|v| v == "true")
}

/// A dev-mode Vault with root token `root`.
pub struct VaultFixture {
    _container: ContainerAsync<GenericImage>,
    addr: String,
}

impl VaultFixture {
    pub async fn new() -> Self {
        let container = GenericImage::new("hashicorp/vault", "1.18.4")
            .with_exposed_port(8200.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Vault server started!"))
            .with_env_var("VAULT_DEV_ROOT_TOKEN_ID", "root")
            .with_env_var("VAULT_DEV_LISTEN_ADDRESS", "0.0.0.0:8200")
            .with_cmd(vec!["server", "-dev", "-dev-root-token-id=root"])
            .start()
            .await
            .expect("Failed to start Vault container");

        let host = container.get_host().await.expect("container host");
        let port = container
            .get_host_port_ipv4(8200)
            .await
            .expect("container port");

        VaultFixture {
            _container: container,
            addr: format!("http://{}:{}", host, port),
        }
    }

    pub fn vault_addr(&self) -> String {
        self.addr.clone()
    }
}
