//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.

use std::time::Duration;

use thiserror::Error;

// ── Fetch errors ──────────────────────────────────────────────────────────────

/// Every way a credential fetch can fail.
///
/// Configuration problems (`Config`, `Parse`, `InvalidIdentity`) are kept
/// apart from remote-side problems (`RemoteExec`, `TimedOut`, `Cancelled`)
/// so callers can tell them apart without string matching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not get IP: machine has no 'openstack-ip-address' annotation")]
    NotFound,

    #[error("{0}")]
    Config(String),

    #[error("invalid remote login identity: {0}")]
    InvalidIdentity(String),

    #[error("cannot read provider spec: {0:#}")]
    Parse(anyhow::Error),

    #[error("remote execution failed: {0}")]
    RemoteExec(String),

    #[error("remote execution timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("remote execution cancelled")]
    Cancelled,

    #[error(
        "remote output is ambiguous: marker found {occurrences} time(s), expected exactly once"
    )]
    AmbiguousOutput { occurrences: usize },
}

impl FetchError {
    /// Returns `true` for failures that happened on the remote channel.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteExec(_) | Self::TimedOut(_) | Self::Cancelled
        )
    }

    /// Stable machine-readable code, used in JSON error output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Config(_) => "config_error",
            Self::InvalidIdentity(_) => "invalid_identity",
            Self::Parse(_) => "parse_error",
            Self::RemoteExec(_) => "remote_exec_error",
            Self::TimedOut(_) => "timed_out",
            Self::Cancelled => "cancelled",
            Self::AmbiguousOutput { .. } => "ambiguous_output",
        }
    }
}

impl From<RunError> for FetchError {
    fn from(err: RunError) -> Self {
        match err {
            RunError::TimedOut { timeout, .. } => Self::TimedOut(timeout),
            RunError::Cancelled { .. } => Self::Cancelled,
            other => Self::RemoteExec(other.to_string()),
        }
    }
}

// ── Process errors ────────────────────────────────────────────────────────────

/// Failure of a single external process run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reading {stream} of {program}: {source}")]
    Read {
        program: String,
        stream: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} timed out after {}s", .timeout.as_secs())]
    TimedOut { program: String, timeout: Duration },

    #[error("{program} cancelled")]
    Cancelled { program: String },
}
