// src/main.rs
use clap::Parser;
use vault_db_role::cli::{run_cli, Cli};
use vault_db_role::init_logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let report = run_cli(&cli).await;
    // stdout carries nothing but the result object
    println!("{}", report.body);
    std::process::exit(report.exit_code);
}
