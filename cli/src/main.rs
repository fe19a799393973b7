//! nodeboot - fetch the admin kubeconfig from a freshly provisioned cluster node

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;

use nodeboot_cli::cli::Cli;
use nodeboot_cli::output::json;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = cli.run().await {
        if json_mode && let Ok(body) = json::format_error(&format!("{e:#}"), json::error_code(&e)) {
            println!("{body}");
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}
