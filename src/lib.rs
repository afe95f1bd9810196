//! vault-db-role - Vault database role provisioning
//!
//! This crate implements `vault_database_role_create`, an Ansible-style
//! module that writes a role into a HashiCorp Vault database secrets
//! engine. Each run authenticates, performs one create-role call and emits
//! a single JSON result.
//!
//! ## Architecture
//!
//! - `cli` module - process host: reads the arguments file, prints the report
//! - `module` module - the role-create adapter and its result type
//! - `params` module - module parameter parsing and validation
//! - `interface` module - the injected capabilities (authenticator, client provider)
//! - `vault` module - HTTP implementations of those capabilities
//!
//! The adapter only sees the traits in `interface`, so the Vault-backed
//! implementations can be swapped for test doubles.

pub mod cli;
pub mod interface;
pub mod module;
pub mod params;
pub mod vault;

pub use interface::{AuthError, Authenticator, DatabaseSecrets, VaultClientProvider};
pub use module::{create_role, execute, ModuleError, ModuleOutput, ModuleReport, ModuleResult};
pub use params::{AuthMethod, ConnectionOptions, ModuleArgs, RoleSpec};

use tracing_subscriber::EnvFilter;

/// Initialize logging for the application.
///
/// `RUST_LOG` takes precedence over `default_filter`. Output goes to stderr
/// so stdout stays reserved for the module result.
pub fn init_logging(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
