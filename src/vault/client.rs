//! Client implementation for Vault API interactions.
//!
//! This module provides a client for making HTTP requests to the Vault API
//! with appropriate authentication and error handling.

use crate::vault::common::check_response;
use crate::vault::{VaultConfig, VaultError};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Certificate, Client, Method,
};
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Client for interacting with the Vault HTTP API.
#[derive(Clone)]
pub struct VaultClient {
    /// Base URL of the Vault server
    pub addr: String,
    /// Auth token for Vault API requests
    token: Option<String>,
    /// HTTP client for making requests
    client: Client,
    /// Custom headers to add to requests
    custom_headers: HeaderMap,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("addr", &self.addr)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl VaultClient {
    /// Creates a new VaultClient with the specified address and token.
    pub fn new(addr: &str, token: Option<&str>) -> Result<Self, VaultError> {
        Self::from_config(&VaultConfig::new(addr), token)
    }

    /// Creates a client honouring the TLS, timeout and namespace settings of
    /// `config`. The config's own token is ignored in favour of `token`.
    pub fn from_config(config: &VaultConfig, token: Option<&str>) -> Result<Self, VaultError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));

        if let Some(ca_path) = &config.ca_cert_path {
            let pem = std::fs::read(ca_path).map_err(|e| {
                VaultError::Config(format!("Failed to read CA certificate {}: {}", ca_path, e))
            })?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                VaultError::Config(format!("Invalid CA certificate {}: {}", ca_path, e))
            })?;
            builder = builder.add_root_certificate(cert);
        }
        if !config.validate_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| VaultError::Network(format!("Failed to create HTTP client: {}", e)))?;

        let mut vault_client = Self {
            addr: config.url.trim_end_matches('/').to_string(),
            token: token.map(str::to_string),
            client,
            custom_headers: HeaderMap::new(),
        };
        if let Some(namespace) = &config.namespace {
            vault_client.add_header("X-Vault-Namespace", namespace);
        }
        Ok(vault_client)
    }

    /// Adds a custom header to the client.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the header
    /// * `value` - The value of the header
    pub fn add_header(&mut self, name: &str, value: &str) -> &mut Self {
        if let (Ok(header_name), Ok(header_value)) =
            (HeaderName::from_str(name), HeaderValue::from_str(value))
        {
            self.custom_headers.insert(header_name, header_value);
        }
        self
    }

    /// Makes a GET request to the Vault API.
    pub async fn get(&self, path: &str) -> Result<Value, VaultError> {
        self.request(Method::GET, path, None).await
    }

    /// Makes a POST request to the Vault API with a JSON body.
    pub async fn post_with_body(&self, path: &str, body: Value) -> Result<Value, VaultError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Makes a request to the Vault API with the specified method and optional body.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, VaultError> {
        let url = format!("{}{}", self.addr, path);
        debug!("Vault request: {} {}", method, url);
        let mut request = self.client.request(method, &url);

        if let Some(token) = &self.token {
            request = request.header("X-Vault-Token", token);
        }

        for (name, value) in self.custom_headers.iter() {
            request = request.header(name, value);
        }

        if let Some(json_body) = body {
            request = request.json(&json_body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| VaultError::Network(format!("Request failed: {}", e)))?;

        check_response(response).await
    }
}
