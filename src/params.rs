//! Module parameter parsing.
//!
//! Parameters arrive as a JSON object, either flat or wrapped in the
//! `ANSIBLE_MODULE_ARGS` envelope. Required arguments, unsupported
//! arguments and value types are checked here so that the adapter only ever
//! sees a well-formed [`ModuleArgs`].

use crate::vault::VaultConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Name reported in parameter error messages.
pub const MODULE_NAME: &str = "vault_database_role_create";

const REQUIRED: &[&str] = &["role_name", "connection_name", "creation_statements"];

const SUPPORTED: &[&str] = &[
    "approle_mount_point",
    "auth_method",
    "ca_cert",
    "connection_name",
    "creation_statements",
    "default_ttl",
    "engine_mount_point",
    "max_ttl",
    "mount_point",
    "namespace",
    "password",
    "renew_statements",
    "revocation_statements",
    "role_id",
    "role_name",
    "rollback_statements",
    "secret_id",
    "timeout",
    "token",
    "token_file",
    "token_path",
    "token_validate",
    "url",
    "username",
    "validate_certs",
];

/// Errors raised while reading module parameters.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("missing required arguments: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error(
        "Unsupported parameters for ({}) module: {}. Supported parameters include: {}.",
        MODULE_NAME,
        .0.join(", "),
        SUPPORTED.join(", ")
    )]
    Unsupported(Vec<String>),

    #[error("{0}")]
    Invalid(String),

    #[error("failed to parse module arguments: {0}")]
    Json(#[from] serde_json::Error),
}

/// Authentication methods accepted by `auth_method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    #[default]
    Token,
    Userpass,
    Ldap,
    Approle,
    #[serde(rename = "none")]
    NoAuth,
    Jwt,
    AwsIam,
    Azure,
    Cert,
}

impl AuthMethod {
    const CHOICES: &'static str = "token, userpass, ldap, approle, none, jwt, aws_iam, azure, cert";

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Token => "token",
            AuthMethod::Userpass => "userpass",
            AuthMethod::Ldap => "ldap",
            AuthMethod::Approle => "approle",
            AuthMethod::NoAuth => "none",
            AuthMethod::Jwt => "jwt",
            AuthMethod::AwsIam => "aws_iam",
            AuthMethod::Azure => "azure",
            AuthMethod::Cert => "cert",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The database role being written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSpec {
    pub role_name: String,
    pub connection_name: String,
    pub creation_statements: Vec<String>,
    pub revocation_statements: Option<Vec<String>>,
    pub rollback_statements: Option<Vec<String>>,
    pub renew_statements: Option<Vec<String>>,
    /// Seconds.
    pub default_ttl: Option<u64>,
    /// Seconds.
    pub max_ttl: Option<u64>,
}

/// How to reach and log in to Vault.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub url: Option<String>,
    pub namespace: Option<String>,
    pub timeout: Option<u64>,
    pub ca_cert: Option<String>,
    pub validate_certs: bool,
    pub auth_method: AuthMethod,
    /// Mount of the auth method; defaults per method.
    pub mount_point: Option<String>,
    pub token: Option<String>,
    pub token_path: Option<String>,
    pub token_file: Option<String>,
    pub token_validate: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub role_id: Option<String>,
    pub secret_id: Option<String>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            url: None,
            namespace: None,
            timeout: None,
            ca_cert: None,
            validate_certs: true,
            auth_method: AuthMethod::default(),
            mount_point: None,
            token: None,
            token_path: None,
            token_file: None,
            token_validate: true,
            username: None,
            password: None,
            role_id: None,
            secret_id: None,
        }
    }
}

impl fmt::Debug for ConnectionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("ConnectionOptions")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("timeout", &self.timeout)
            .field("ca_cert", &self.ca_cert)
            .field("validate_certs", &self.validate_certs)
            .field("auth_method", &self.auth_method)
            .field("mount_point", &self.mount_point)
            .field("token", &redact(&self.token))
            .field("token_path", &self.token_path)
            .field("token_file", &self.token_file)
            .field("token_validate", &self.token_validate)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("role_id", &self.role_id)
            .field("secret_id", &redact(&self.secret_id))
            .finish()
    }
}

impl ConnectionOptions {
    /// Fills unset options from `VAULT_*` variables. Explicit values win.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, var: &str| {
            if slot.is_none() {
                *slot = lookup(var).filter(|v| !v.is_empty());
            }
        };
        fill(&mut self.url, "VAULT_ADDR");
        fill(&mut self.token, "VAULT_TOKEN");
        fill(&mut self.namespace, "VAULT_NAMESPACE");
        fill(&mut self.ca_cert, "VAULT_CACERT");
    }

    pub fn vault_config(&self) -> VaultConfig {
        let mut config = match &self.url {
            Some(url) => VaultConfig::new(url),
            None => VaultConfig::default(),
        };
        config.namespace = self.namespace.clone();
        config.ca_cert_path = self.ca_cert.clone();
        config.validate_certs = self.validate_certs;
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config
    }
}

/// Everything one invocation of the module needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleArgs {
    pub role: RoleSpec,
    /// Mount of the database secrets engine; `None` means Vault's default.
    pub engine_mount_point: Option<String>,
    pub connection: ConnectionOptions,
    pub check_mode: bool,
}

impl ModuleArgs {
    /// Parses module arguments, using the process environment for fallbacks.
    pub fn from_json(raw: &str) -> Result<Self, ParamsError> {
        Self::from_json_with_env(raw, |var| std::env::var(var).ok())
    }

    pub fn from_json_with_env<F>(raw: &str, lookup: F) -> Result<Self, ParamsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value: Value = serde_json::from_str(raw)?;
        let mut args = Self::from_value(value)?;
        args.connection.apply_env(lookup);
        Ok(args)
    }

    /// Parses an already-decoded argument object. No environment fallbacks.
    pub fn from_value(value: Value) -> Result<Self, ParamsError> {
        let mut map = match value {
            Value::Object(mut map) => match map.remove("ANSIBLE_MODULE_ARGS") {
                Some(Value::Object(inner)) => inner,
                Some(_) => {
                    return Err(ParamsError::Invalid(
                        "ANSIBLE_MODULE_ARGS must be an object".into(),
                    ))
                }
                None => map,
            },
            _ => {
                return Err(ParamsError::Invalid(
                    "module arguments must be a JSON object".into(),
                ))
            }
        };

        let check_mode = match map.remove("_ansible_check_mode") {
            Some(Value::Bool(b)) => b,
            _ => false,
        };
        map.retain(|key, _| !key.starts_with("_ansible_"));

        let mut unsupported: Vec<String> = map
            .keys()
            .filter(|k| !SUPPORTED.contains(&k.as_str()))
            .cloned()
            .collect();
        if !unsupported.is_empty() {
            unsupported.sort();
            return Err(ParamsError::Unsupported(unsupported));
        }

        let mut missing: Vec<String> = REQUIRED
            .iter()
            .filter(|k| map.get(**k).map_or(true, Value::is_null))
            .map(|k| k.to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(ParamsError::Missing(missing));
        }

        let role = RoleSpec {
            role_name: required(&map, "role_name")?,
            connection_name: required(&map, "connection_name")?,
            creation_statements: required(&map, "creation_statements")?,
            revocation_statements: optional(&map, "revocation_statements")?,
            rollback_statements: optional(&map, "rollback_statements")?,
            renew_statements: optional(&map, "renew_statements")?,
            default_ttl: int(&map, "default_ttl")?,
            max_ttl: int(&map, "max_ttl")?,
        };

        let auth_method = match optional::<String>(&map, "auth_method")? {
            Some(name) => serde_json::from_value(Value::String(name.clone())).map_err(|_| {
                ParamsError::Invalid(format!(
                    "value of auth_method must be one of: {}, got: {}",
                    AuthMethod::CHOICES,
                    name
                ))
            })?,
            None => AuthMethod::default(),
        };

        let connection = ConnectionOptions {
            url: optional(&map, "url")?,
            namespace: optional(&map, "namespace")?,
            timeout: int(&map, "timeout")?,
            ca_cert: optional(&map, "ca_cert")?,
            validate_certs: boolean(&map, "validate_certs", true)?,
            auth_method,
            mount_point: optional::<String>(&map, "mount_point")?
                .or(optional(&map, "approle_mount_point")?),
            token: optional(&map, "token")?,
            token_path: optional(&map, "token_path")?,
            token_file: optional(&map, "token_file")?,
            token_validate: boolean(&map, "token_validate", true)?,
            username: optional(&map, "username")?,
            password: optional(&map, "password")?,
            role_id: optional(&map, "role_id")?,
            secret_id: optional(&map, "secret_id")?,
        };

        Ok(Self {
            role,
            engine_mount_point: optional(&map, "engine_mount_point")?,
            connection,
            check_mode,
        })
    }
}

fn optional<T: DeserializeOwned>(
    map: &Map<String, Value>,
    name: &str,
) -> Result<Option<T>, ParamsError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| {
                ParamsError::Invalid(format!(
                    "argument '{}' is of an invalid type: {}",
                    name, e
                ))
            }),
    }
}

fn required<T: DeserializeOwned>(map: &Map<String, Value>, name: &str) -> Result<T, ParamsError> {
    optional(map, name)?.ok_or_else(|| ParamsError::Missing(vec![name.to_string()]))
}

/// Non-negative integer argument; numeric strings are coerced the way
/// Ansible's `int` type does.
fn int(map: &Map<String, Value>, name: &str) -> Result<Option<u64>, ParamsError> {
    let unconvertible = |type_name: &str| {
        ParamsError::Invalid(format!(
            "argument '{}' is of type {} and we were unable to convert to int",
            name, type_name
        ))
    };
    let negative = |value: i64| {
        ParamsError::Invalid(format!(
            "argument '{}' is of type int and must be a non-negative integer, got {}",
            name, value
        ))
    };
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => match (n.as_u64(), n.as_i64()) {
            (Some(v), _) => Ok(Some(v)),
            (None, Some(v)) => Err(negative(v)),
            (None, None) => Err(unconvertible("float")),
        },
        Some(Value::String(s)) => {
            let s = s.trim();
            match (s.parse::<u64>(), s.parse::<i64>()) {
                (Ok(v), _) => Ok(Some(v)),
                (Err(_), Ok(v)) => Err(negative(v)),
                _ => Err(unconvertible("str")),
            }
        }
        Some(Value::Bool(_)) => Err(unconvertible("bool")),
        Some(Value::Array(_)) => Err(unconvertible("list")),
        Some(Value::Object(_)) => Err(unconvertible("dict")),
    }
}

fn boolean(map: &Map<String, Value>, name: &str, default: bool) -> Result<bool, ParamsError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "yes" | "true" | "on" | "1" => Ok(true),
            "no" | "false" | "off" | "0" => Ok(false),
            _ => Err(ParamsError::Invalid(format!(
                "argument '{}' is of type str and we were unable to convert to bool",
                name
            ))),
        },
        Some(_) => Err(ParamsError::Invalid(format!(
            "argument '{}' must be a boolean",
            name
        ))),
    }
}
