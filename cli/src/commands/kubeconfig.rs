//! `nodeboot kubeconfig`: fetch the admin kubeconfig from a machine.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::app::AppContext;
use crate::application::{CancelHandle, cancel_pair};
use crate::commands::load_machine;
use crate::domain::{CredentialPayload, FetcherConfig, OutputPolicy};
use crate::infra::credential_file::write_credential;
use crate::output::json;
use crate::provider::new_deployment_client;

/// Arguments for the kubeconfig command.
#[derive(Args)]
pub struct KubeconfigArgs {
    /// Machine manifest (YAML or JSON)
    #[arg(long, short)]
    pub machine: PathBuf,

    /// Write the kubeconfig here (mode 600) instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Give up on the remote command after this many seconds
    #[arg(long, env = "NODEBOOT_EXEC_TIMEOUT", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Return an empty result instead of failing when the output is ambiguous
    #[arg(long)]
    pub compatible: bool,
}

#[derive(Serialize)]
struct KubeconfigReport<'a> {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    kubeconfig: Option<&'a str>,
}

/// Applies command-line overrides on top of the loaded config.
#[must_use]
pub fn effective_config(base: &FetcherConfig, args: &KubeconfigArgs) -> FetcherConfig {
    let mut config = base.clone();
    if let Some(secs) = args.timeout {
        config.exec_timeout_secs = secs;
    }
    if args.compatible {
        config.output_policy = OutputPolicy::Compatible;
    }
    config
}

/// Runs `fetch` to completion, cancelling it through `handle` when
/// `interrupt` resolves first.
///
/// An interrupt source that fails (for example a signal handler that could
/// not be installed) leaves the fetch running.
pub async fn cancel_on_interrupt<F, I>(fetch: F, handle: &CancelHandle, interrupt: I) -> F::Output
where
    F: Future,
    I: Future<Output = std::io::Result<()>>,
{
    tokio::pin!(fetch);
    tokio::select! {
        result = &mut fetch => result,
        Ok(()) = interrupt => {
            tracing::info!("interrupt received, cancelling fetch");
            handle.cancel();
            fetch.await
        }
    }
}

fn report<'a>(payload: &'a CredentialPayload, path: Option<String>) -> KubeconfigReport<'a> {
    KubeconfigReport {
        found: payload.is_found(),
        kubeconfig: match payload {
            CredentialPayload::Found(text) if path.is_none() => Some(text),
            _ => None,
        },
        path,
    }
}

/// Run `nodeboot kubeconfig --machine <file>`.
///
/// Ctrl-C cancels the in-flight ssh process.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read, the fetch fails, or the
/// output file cannot be written.
pub async fn run(app: &AppContext, args: &KubeconfigArgs) -> Result<()> {
    let machine = load_machine(&args.machine)?;
    let client = new_deployment_client(effective_config(&app.config, args));

    let (handle, token) = cancel_pair();
    let payload = cancel_on_interrupt(
        client.fetch_credential(machine.annotations(), &machine.spec.provider_spec, &token),
        &handle,
        tokio::signal::ctrl_c(),
    )
    .await
    .context("fetching admin kubeconfig")?;

    if let CredentialPayload::Empty = payload {
        app.output
            .warn("remote output did not contain a kubeconfig; nothing retrieved");
    }

    let path = match (&args.output, &payload) {
        (Some(path), CredentialPayload::Found(text)) => {
            write_credential(path, text)?;
            Some(path.display().to_string())
        }
        _ => None,
    };

    if app.is_json() {
        println!("{}", json::to_pretty(&report(&payload, path))?);
    } else if let Some(path) = &path {
        app.output.success(&format!("admin kubeconfig written to {path}"));
    } else if let CredentialPayload::Found(text) = &payload {
        println!("{text}");
    }
    Ok(())
}
