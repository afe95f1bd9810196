//! The role-create adapter.
//!
//! One invocation authenticates, validates, performs a single create-role
//! write and reports the outcome. Nothing is retried and no state survives
//! the call.

use crate::interface::{AuthError, Authenticator, DatabaseSecrets, VaultClientProvider};
use crate::params::{ModuleArgs, ParamsError};
use crate::vault::common::DEFAULT_DATABASE_MOUNT;
use crate::vault::{CreateRoleRequest, HttpClientProvider, VaultAuthenticator, VaultError};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, info};

/// Successful outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleOutput {
    pub changed: bool,
}

/// Every way an invocation can fail. `Display` is the message reported to
/// the caller.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Forbidden: Permission Denied to path ['{mount}'].")]
    Forbidden { mount: String, source: VaultError },

    #[error("Invalid or missing path ['{mount}/roles/{role}'].")]
    InvalidPath {
        mount: String,
        role: String,
        source: VaultError,
    },

    #[error(transparent)]
    Vault(#[from] VaultError),
}

pub type ModuleResult = Result<ModuleOutput, ModuleError>;

/// Creates the role described by `args`.
///
/// Runs `authenticate()`, then `validate()`, then a single `create_role`
/// call on a client from `provider`. In check mode the write is skipped and
/// the role is reported as changed.
pub async fn create_role<A, P>(
    args: &ModuleArgs,
    authenticator: &mut A,
    provider: &P,
) -> ModuleResult
where
    A: Authenticator + ?Sized,
    P: VaultClientProvider,
{
    authenticator.authenticate().await?;
    authenticator.validate().await?;

    if args.check_mode {
        info!(
            "Check mode: would write database role '{}'",
            args.role.role_name
        );
        return Ok(ModuleOutput { changed: true });
    }

    let token = authenticator.token();
    let client = provider.vault_client(token.as_deref())?;

    let request = CreateRoleRequest::from_args(&args.role, args.engine_mount_point.as_deref());
    // Messages name the mount as the caller wrote it.
    let mount = args
        .engine_mount_point
        .as_deref()
        .filter(|m| !m.is_empty())
        .unwrap_or(DEFAULT_DATABASE_MOUNT);

    match client.create_role(&request).await {
        Ok(_) => {
            info!("Database role '{}' written", args.role.role_name);
            Ok(ModuleOutput { changed: true })
        }
        Err(source @ VaultError::Forbidden(_)) => Err(ModuleError::Forbidden {
            mount: mount.to_string(),
            source,
        }),
        Err(source @ VaultError::InvalidPath(_)) => Err(ModuleError::InvalidPath {
            mount: mount.to_string(),
            role: args.role.role_name.clone(),
            source,
        }),
        Err(e) => Err(ModuleError::Vault(e)),
    }
}

/// Production entry point: parses raw module arguments and runs the adapter
/// against a live Vault.
pub async fn execute(raw_args: &str) -> ModuleResult {
    let args = ModuleArgs::from_json(raw_args)?;
    let provider = HttpClientProvider::new(args.connection.vault_config());
    let mut authenticator = VaultAuthenticator::new(args.connection.clone());
    create_role(&args, &mut authenticator, &provider).await
}

/// The JSON result and exit status of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleReport {
    pub body: Value,
    pub exit_code: i32,
}

impl From<&ModuleResult> for ModuleReport {
    fn from(result: &ModuleResult) -> Self {
        match result {
            Ok(output) => ModuleReport {
                body: json!({ "changed": output.changed }),
                exit_code: 0,
            },
            Err(e) => {
                error!("{}", e);
                ModuleReport {
                    body: json!({ "failed": true, "msg": e.to_string() }),
                    exit_code: 1,
                }
            }
        }
    }
}

impl From<ModuleResult> for ModuleReport {
    fn from(result: ModuleResult) -> Self {
        ModuleReport::from(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_message() {
        let err = ModuleError::Forbidden {
            mount: "path/1".into(),
            source: VaultError::Forbidden("permission denied".into()),
        };
        assert_eq!(
            err.to_string(),
            "Forbidden: Permission Denied to path ['path/1']."
        );
    }

    #[test]
    fn test_invalid_path_message() {
        let err = ModuleError::InvalidPath {
            mount: "second/path".into(),
            role: "foo".into(),
            source: VaultError::InvalidPath(String::new()),
        };
        assert_eq!(
            err.to_string(),
            "Invalid or missing path ['second/path/roles/foo']."
        );
    }

    #[test]
    fn test_report_rendering() {
        let ok: ModuleResult = Ok(ModuleOutput { changed: true });
        let report = ModuleReport::from(&ok);
        assert_eq!(report.body, json!({"changed": true}));
        assert_eq!(report.exit_code, 0);

        let failed: ModuleResult = Err(AuthError::Value("throwaway msg".into()).into());
        let report = ModuleReport::from(failed);
        assert_eq!(report.body["msg"], "throwaway msg");
        assert_eq!(report.body["failed"], true);
        assert_ne!(report.exit_code, 0);
    }

    #[tokio::test]
    async fn test_execute_reports_parameter_errors() {
        let result = execute(r#"{"role_name": "foo"}"#).await;
        assert!(matches!(result, Err(ModuleError::Params(ParamsError::Missing(_)))));

        let result = execute("not json").await;
        assert!(matches!(result, Err(ModuleError::Params(ParamsError::Json(_)))));
    }
}
