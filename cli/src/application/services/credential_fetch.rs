//! Application service: admin kubeconfig retrieval use-case.
//!
//! Imports only from `crate::domain` and `crate::application`.
//! All I/O is routed through injected port traits.

use std::path::Path;

use nodeboot_common::{Annotations, ProviderSpec};

use crate::application::cancel::CancelToken;
use crate::application::ports::{CommandRunner, Environment, ProviderSpecParser};
use crate::domain::{
    CredentialPayload, Extraction, FetchError, FetcherConfig, MARKER, OutputPolicy,
    RemoteCommand, RemoteLoginIdentity, extract, resolve_address,
};

/// Resolves a node's address and pulls its admin kubeconfig over ssh.
///
/// Holds no mutable state, so one instance can serve fetches for several
/// nodes concurrently.
pub struct CredentialFetcher<R, E, P> {
    runner: R,
    env: E,
    parser: P,
    config: FetcherConfig,
}

impl<R, E, P> CredentialFetcher<R, E, P>
where
    R: CommandRunner,
    E: Environment,
    P: ProviderSpecParser,
{
    pub fn new(runner: R, env: E, parser: P, config: FetcherConfig) -> Self {
        Self {
            runner,
            env,
            parser,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Returns the reachable address recorded on the machine.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] if the address annotation is absent.
    pub fn resolve_address(&self, annotations: Option<&Annotations>) -> Result<String, FetchError> {
        resolve_address(annotations)
    }

    /// Assembles the login identity: address, then key directory, then user.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error unchanged.
    pub fn login_identity(
        &self,
        annotations: Option<&Annotations>,
        spec: &ProviderSpec,
    ) -> Result<RemoteLoginIdentity, FetchError> {
        let address = resolve_address(annotations)?;

        let var = &self.config.base_dir_var;
        let base_dir = self
            .env
            .var(var)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                FetchError::Config(format!(
                    "unable to use {var} environment variable to find SSH key"
                ))
            })?;

        let username = self.parser.username_for(spec).map_err(FetchError::Parse)?;

        let identity = RemoteLoginIdentity {
            username,
            address,
            key_file: Path::new(&base_dir).join(&self.config.key_subpath),
        };
        identity.validate()?;
        Ok(identity)
    }

    /// Fetches the admin kubeconfig from the node described by
    /// `annotations` and `spec`.
    ///
    /// Exactly one ssh process is started, and only after every local check
    /// has passed. It is killed when the configured timeout elapses or
    /// `cancel` fires.
    ///
    /// # Errors
    ///
    /// Local problems surface as `NotFound`, `Config`, `Parse` or
    /// `InvalidIdentity`; channel problems as `RemoteExec`, `TimedOut` or
    /// `Cancelled`; an unrecognisable reply as `AmbiguousOutput` unless the
    /// output policy is `Compatible`.
    pub async fn fetch_credential(
        &self,
        annotations: Option<&Annotations>,
        spec: &ProviderSpec,
        cancel: &CancelToken,
    ) -> Result<CredentialPayload, FetchError> {
        let identity = self.login_identity(annotations, spec)?;
        self.config.validate()?;
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let args = identity.ssh_args(
            &self.config.ssh_options(),
            &RemoteCommand::fetch_admin_conf(),
        );
        let argv: Vec<&str> = args.iter().map(String::as_str).collect();
        let program = self.config.ssh_program.as_str();

        tracing::info!(
            destination = %identity.destination(),
            key_file = %identity.key_file.display(),
            timeout_secs = self.config.exec_timeout_secs,
            "fetching admin kubeconfig",
        );

        let output = self
            .runner
            .run_cancellable(program, &argv, self.config.exec_timeout(), cancel)
            .await?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FetchError::RemoteExec(format!(
                "{program} exited with status {code}: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            FetchError::RemoteExec(format!(
                "{program} wrote invalid UTF-8 to stdout at byte {}",
                e.utf8_error().valid_up_to()
            ))
        })?;
        match extract(&stdout, MARKER) {
            Extraction::Payload(payload) => {
                tracing::info!(bytes = payload.len(), "admin kubeconfig retrieved");
                Ok(CredentialPayload::Found(payload))
            }
            Extraction::Ambiguous { occurrences } => match self.config.output_policy {
                OutputPolicy::Strict => Err(FetchError::AmbiguousOutput { occurrences }),
                OutputPolicy::Compatible => {
                    tracing::warn!(
                        occurrences,
                        "marker not found exactly once, returning empty credential",
                    );
                    Ok(CredentialPayload::Empty)
                }
            },
        }
    }
}
