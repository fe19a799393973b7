//! Application context: unified state passed to every command handler.

use std::path::Path;

use anyhow::Result;

use crate::domain::FetcherConfig;
use crate::infra::YamlConfigStore;
use crate::output::OutputContext;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags<'a> {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
    /// Explicit config file, overriding `~/.nodeboot/config.yaml`.
    pub config_path: Option<&'a Path>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Fetcher settings loaded from the config file.
    pub config: FetcherConfig,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be loaded.
    pub fn new(flags: &AppFlags<'_>) -> Result<Self> {
        let config = match flags.config_path {
            Some(path) => YamlConfigStore::with_path(path.to_path_buf()).load()?,
            None => match YamlConfigStore::new() {
                Ok(store) => store.load()?,
                Err(e) => {
                    tracing::debug!(error = %e, "no home directory, using default config");
                    FetcherConfig::default()
                }
            },
        };
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        Ok(Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            mode,
            config,
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }
}
