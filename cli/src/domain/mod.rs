//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod address;
pub mod config;
pub mod credential;
pub mod error;
pub mod extract;
pub mod identity;

pub use address::{resolve_address, resolve_resource_id};
pub use config::{FetcherConfig, OutputPolicy};
pub use credential::CredentialPayload;
pub use error::{FetchError, RunError};
pub use extract::{ADMIN_CONF_PATH, Extraction, MARKER, extract};
pub use identity::{RemoteCommand, RemoteLoginIdentity, SshOptions, shell_quote};
