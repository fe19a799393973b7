//! `nodeboot address`: print the reachable address of a machine.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::commands::load_machine;
use crate::domain::resolve_resource_id;
use crate::output::json;
use crate::provider::new_deployment_client;

/// Arguments for the address command.
#[derive(Args)]
pub struct AddressArgs {
    /// Machine manifest (YAML or JSON)
    #[arg(long, short)]
    pub machine: PathBuf,
}

#[derive(Serialize)]
struct AddressReport {
    address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    resource_id: Option<String>,
}

/// Run `nodeboot address --machine <file>`.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or carries no address.
pub fn run(app: &AppContext, args: &AddressArgs) -> Result<()> {
    let machine = load_machine(&args.machine)?;
    let client = new_deployment_client(app.config.clone());
    let report = AddressReport {
        address: client.resolve_address(machine.annotations())?,
        resource_id: resolve_resource_id(machine.annotations()),
    };

    if app.is_json() {
        println!("{}", json::to_pretty(&report)?);
    } else {
        println!("{}", report.address);
        if let Some(id) = &report.resource_id {
            app.output.kv("resource id", id);
        }
    }
    Ok(())
}
