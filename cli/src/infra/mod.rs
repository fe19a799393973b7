//! Infrastructure layer: concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution,
//! environment and filesystem access, and provider spec decoding.
//!
//! Imports from `crate::domain` and `crate::application` are allowed.
//! Imports from `crate::commands` or `crate::output` are forbidden.

pub mod command_runner;
pub mod config;
pub mod credential_file;
pub mod env;
pub mod provider_spec;

pub use command_runner::TokioCommandRunner;
pub use config::YamlConfigStore;
pub use env::ProcessEnvironment;
pub use provider_spec::OpenstackSpecParser;
