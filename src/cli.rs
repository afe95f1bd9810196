use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::module::{execute, ModuleError, ModuleReport};
use crate::params::ParamsError;

#[derive(Parser, Debug)]
#[command(
    name = "vault_database_role_create",
    about = "Create a role in a Vault database secrets engine",
    version
)]
pub struct Cli {
    /// Module arguments file as written by Ansible. Reads stdin when omitted or `-`.
    #[arg(value_name = "ARGS_FILE")]
    pub args_file: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset. Logs go to stderr.
    #[arg(long, default_value = "warn", env = "VAULT_DB_ROLE_LOG")]
    pub log_level: String,
}

/// Reads the raw module arguments from `path`, or stdin.
pub async fn read_args(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read module arguments from {}", path.display())),
        _ => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("failed to read module arguments from stdin")?;
            Ok(raw)
        }
    }
}

/// Runs one module invocation and returns the report to print.
pub async fn run_cli(cli: &Cli) -> ModuleReport {
    let result = match read_args(cli.args_file.as_deref()).await {
        Ok(raw) => {
            debug!("Read {} bytes of module arguments", raw.len());
            execute(&raw).await
        }
        Err(err) => Err(ModuleError::Params(ParamsError::Invalid(format!("{:#}", err)))),
    };
    ModuleReport::from(&result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_cli_parses_positional_args_file() {
        let cli = Cli::try_parse_from(["vault_database_role_create", "/tmp/args"]).unwrap();
        assert_eq!(cli.args_file, Some(PathBuf::from("/tmp/args")));
        assert_eq!(cli.log_level, "warn");
    }

    #[tokio::test]
    async fn test_read_args_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"role_name": "foo"}}"#).unwrap();
        let raw = read_args(Some(file.path())).await.unwrap();
        assert_eq!(raw, r#"{"role_name": "foo"}"#);
    }

    #[tokio::test]
    async fn test_unreadable_args_file_is_reported() {
        let cli = Cli {
            args_file: Some(PathBuf::from("/nonexistent/args.json")),
            log_level: "warn".into(),
        };
        let report = run_cli(&cli).await;
        assert_eq!(report.exit_code, 1);
        assert_eq!(report.body["failed"], json!(true));
        assert!(report.body["msg"]
            .as_str()
            .unwrap()
            .starts_with("failed to read module arguments from /nonexistent/args.json"));
    }
}
