//! Production wiring of the OpenStack deployment client.
//!
//! Callers construct the client explicitly and own it; nothing is
//! registered in process-wide state.

use crate::application::services::CredentialFetcher;
use crate::domain::FetcherConfig;
use crate::infra::{OpenstackSpecParser, ProcessEnvironment, TokioCommandRunner};

pub use nodeboot_common::PROVIDER_NAME;

/// Credential fetcher backed by real processes and the real environment.
pub type DeploymentClient =
    CredentialFetcher<TokioCommandRunner, ProcessEnvironment, OpenstackSpecParser>;

/// Builds a deployment client for the OpenStack provider.
#[must_use]
pub fn new_deployment_client(config: FetcherConfig) -> DeploymentClient {
    let runner = TokioCommandRunner::new(config.exec_timeout());
    CredentialFetcher::new(runner, ProcessEnvironment, OpenstackSpecParser, config)
}
