//! Domain types for nodeboot configuration.
//!
//! Pure types only, with no I/O or async.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::error::FetchError;
use crate::domain::identity::SshOptions;

/// What to do when the marker is not found exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputPolicy {
    /// Fail with `AmbiguousOutput`.
    #[default]
    Strict,
    /// Return an empty credential without an error.
    Compatible,
}

/// Fetcher settings stored in `~/.nodeboot/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// ssh client executable.
    pub ssh_program: String,
    /// Environment variable naming the base directory for the key file.
    pub base_dir_var: String,
    /// Key file location relative to the base directory.
    pub key_subpath: String,
    pub connect_timeout_secs: u64,
    /// Upper bound on the whole remote invocation.
    pub exec_timeout_secs: u64,
    pub output_policy: OutputPolicy,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            ssh_program: "ssh".to_string(),
            base_dir_var: "HOME".to_string(),
            key_subpath: ".ssh/openstack_tmp".to_string(),
            connect_timeout_secs: 10,
            exec_timeout_secs: 60,
            output_policy: OutputPolicy::Strict,
        }
    }
}

impl FetcherConfig {
    /// Rejects settings that would make every fetch fail before it starts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] if either timeout is zero.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.exec_timeout_secs == 0 {
            return Err(FetchError::Config(
                "exec_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(FetchError::Config(
                "connect_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn exec_timeout(&self) -> Duration {
        Duration::from_secs(self.exec_timeout_secs)
    }

    #[must_use]
    pub fn ssh_options(&self) -> SshOptions {
        SshOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
        }
    }
}
