//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::process::Output;
use std::time::Duration;

use anyhow::Result;
use nodeboot_common::ProviderSpec;

use crate::application::cancel::CancelToken;
use crate::domain::RunError;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output, RunError>;

    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output, RunError> {
        self.run_cancellable(program, args, timeout, &CancelToken::never())
            .await
    }

    /// Run a program that is killed on timeout or when `cancel` fires.
    ///
    /// # Errors
    ///
    /// Returns `RunError::TimedOut` or `RunError::Cancelled` after killing
    /// the child, or a spawn/wait error.
    async fn run_cancellable(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
        cancel: &CancelToken,
    ) -> Result<Output, RunError>;
}

// ── Environment Port ──────────────────────────────────────────────────────────

/// Read access to process environment variables.
pub trait Environment {
    /// Value of `name`, or `None` when unset or not valid Unicode.
    fn var(&self, name: &str) -> Option<String>;
}

// ── Provider Spec Port ────────────────────────────────────────────────────────

/// Extracts the remote login user from a provider-specific machine spec.
pub trait ProviderSpecParser {
    /// # Errors
    ///
    /// Returns an error if the spec is missing or malformed.
    fn username_for(&self, spec: &ProviderSpec) -> Result<String>;
}
