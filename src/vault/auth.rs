//! Authentication against Vault.
//!
//! [`VaultAuthenticator`] turns [`ConnectionOptions`] into a Vault token.
//! `authenticate()` checks the options for the chosen method and performs
//! the login; `validate()` confirms the resulting identity where the method
//! allows it.

use crate::interface::{AuthError, Authenticator};
use crate::params::{AuthMethod, ConnectionOptions};
use crate::vault::common::{mount_or_default, mount_segments, path_segment};
use crate::vault::{VaultClient, VaultConfig, VaultError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{debug, info, warn};

const DEFAULT_TOKEN_FILE: &str = ".vault-token";

pub struct VaultAuthenticator {
    options: ConnectionOptions,
    config: VaultConfig,
    token: Option<String>,
    authenticated: bool,
}

impl VaultAuthenticator {
    pub fn new(options: ConnectionOptions) -> Self {
        let config = options.vault_config();
        Self {
            options,
            config,
            token: None,
            authenticated: false,
        }
    }

    pub fn method(&self) -> AuthMethod {
        self.options.auth_method
    }

    /// Fails with the list of unset options, in the order given.
    fn require(&self, options: &[(&str, &Option<String>)]) -> Result<(), AuthError> {
        let missing: Vec<&str> = options
            .iter()
            .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
            .map(|(name, _)| *name)
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        let quote = |names: Vec<&str>| {
            names
                .iter()
                .map(|n| format!("'{}'", n))
                .collect::<Vec<_>>()
                .join(", ")
        };
        Err(AuthError::Value(format!(
            "Authentication method {} requires options [{}] to be set, but these are missing: [{}]",
            self.method(),
            quote(options.iter().map(|(name, _)| *name).collect()),
            quote(missing)
        )))
    }

    /// Token from the options, or from `<token_path>/<token_file>`.
    async fn discover_token(&self) -> Result<String, AuthError> {
        if let Some(token) = self.options.token.as_deref().filter(|t| !t.is_empty()) {
            return Ok(token.to_string());
        }

        let dir = self
            .options
            .token_path
            .clone()
            .or_else(|| std::env::var("HOME").ok());
        if let Some(dir) = dir {
            let file = self
                .options
                .token_file
                .as_deref()
                .unwrap_or(DEFAULT_TOKEN_FILE);
            let path = PathBuf::from(dir).join(file);
            match tokio::fs::read_to_string(&path).await {
                Ok(contents) if !contents.trim().is_empty() => {
                    debug!("Using token from {}", path.display());
                    return Ok(contents.trim().to_string());
                }
                Ok(_) => debug!("Token file {} is empty", path.display()),
                Err(e) => debug!("No token file at {}: {}", path.display(), e),
            }
        }

        Err(AuthError::Value(
            "No Vault Token specified or discovered.".to_string(),
        ))
    }

    /// `/v1/auth/<mount>/login[/<name>]` with the mount and name escaped.
    fn login_path(&self, default_mount: &str, name: Option<&str>) -> Result<String, AuthError> {
        let mount = mount_or_default(self.options.mount_point.as_deref(), default_mount);
        let invalid = |e: VaultError| AuthError::Value(e.to_string());
        let mut segments = vec!["v1".to_string(), "auth".to_string()];
        segments.extend(mount_segments(mount).map_err(invalid)?);
        segments.push("login".to_string());
        if let Some(name) = name {
            segments.push(path_segment(name).map_err(invalid)?);
        }
        Ok(format!("/{}", segments.join("/")))
    }

    fn client(&self, token: Option<&str>) -> Result<VaultClient, AuthError> {
        VaultClient::from_config(&self.config, token).map_err(|e| AuthError::Value(e.to_string()))
    }

    /// Posts a login request and extracts `auth.client_token`.
    async fn login(&self, path: &str, body: Value) -> Result<String, AuthError> {
        let response = self
            .client(None)?
            .post_with_body(path, body)
            .await
            .map_err(|e| {
                warn!("Login with {} failed: {}", self.method(), e);
                AuthError::Value(e.to_string())
            })?;

        response
            .get("auth")
            .and_then(|auth| auth.get("client_token"))
            .and_then(|token| token.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                AuthError::Value(format!(
                    "Vault login with {} did not return a client token",
                    self.method()
                ))
            })
    }

    fn not_implemented(&self) -> AuthError {
        AuthError::NotImplemented(format!(
            "auth method '{}' is not implemented",
            self.method()
        ))
    }
}

#[async_trait]
impl Authenticator for VaultAuthenticator {
    async fn authenticate(&mut self) -> Result<(), AuthError> {
        info!(
            "Authenticating to {} with auth method {}",
            self.config.url,
            self.method()
        );

        let token = match self.method() {
            AuthMethod::Token => Some(self.discover_token().await?),
            AuthMethod::Userpass | AuthMethod::Ldap => {
                self.require(&[
                    ("username", &self.options.username),
                    ("password", &self.options.password),
                ])?;
                let path = self.login_path(
                    self.method().as_str(),
                    Some(self.options.username.as_deref().unwrap_or_default()),
                )?;
                let body = json!({ "password": self.options.password });
                Some(self.login(&path, body).await?)
            }
            AuthMethod::Approle => {
                self.require(&[("role_id", &self.options.role_id)])?;
                let path = self.login_path("approle", None)?;
                let mut body = json!({ "role_id": self.options.role_id });
                if let Some(secret_id) = &self.options.secret_id {
                    body["secret_id"] = json!(secret_id);
                }
                Some(self.login(&path, body).await?)
            }
            AuthMethod::NoAuth => None,
            AuthMethod::Jwt | AuthMethod::AwsIam | AuthMethod::Azure | AuthMethod::Cert => {
                return Err(self.not_implemented())
            }
        };

        self.token = token;
        self.authenticated = true;
        Ok(())
    }

    async fn validate(&self) -> Result<(), AuthError> {
        if !self.authenticated {
            return Err(AuthError::Value(
                "authenticate() must be called before validate()".to_string(),
            ));
        }

        match self.method() {
            AuthMethod::Token if self.options.token_validate => {
                let client = self.client(self.token.as_deref())?;
                match client.get("/v1/auth/token/lookup-self").await {
                    Ok(_) => {
                        debug!("Token validated");
                        Ok(())
                    }
                    Err(VaultError::Network(e)) => Err(AuthError::Value(e)),
                    Err(e) => {
                        warn!("Token lookup failed: {}", e);
                        Err(AuthError::Value("Invalid Vault Token Specified.".to_string()))
                    }
                }
            }
            AuthMethod::Jwt | AuthMethod::AwsIam | AuthMethod::Azure | AuthMethod::Cert => {
                Err(self.not_implemented())
            }
            _ => Ok(()),
        }
    }

    fn token(&self) -> Option<String> {
        self.token.clone()
    }
}
