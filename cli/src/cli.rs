//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use crate::app::{AppContext, AppFlags};
use crate::commands;

/// Fetch the admin kubeconfig from a freshly provisioned cluster node
#[derive(Parser)]
#[command(
    name = "nodeboot",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config file (default: ~/.nodeboot/config.yaml)
    #[arg(long, global = true, env = "NODEBOOT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the reachable address of a machine
    Address(commands::address::AddressArgs),

    /// Fetch the admin kubeconfig from a machine over ssh
    Kubeconfig(commands::kubeconfig::KubeconfigArgs),

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or the command fails.
    pub async fn run(self) -> Result<()> {
        crate::logging::init(self.verbose);
        let app = AppContext::new(&AppFlags {
            no_color: self.no_color,
            quiet: self.quiet,
            json: self.json,
            config_path: self.config.as_deref(),
        })?;
        match &self.command {
            Command::Address(args) => commands::address::run(&app, args),
            Command::Kubeconfig(args) => commands::kubeconfig::run(&app, args).await,
            Command::Version => {
                commands::version::run(&app);
                Ok(())
            }
        }
    }
}
