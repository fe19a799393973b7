//! OpenStack implementation of the `ProviderSpecParser` port.

use anyhow::{Context, Result};
use nodeboot_common::{ProviderSpec, machine_spec_from_provider_spec};

use crate::application::ports::ProviderSpecParser;

/// Reads `sshUserName` from an OpenStack provider spec.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenstackSpecParser;

impl ProviderSpecParser for OpenstackSpecParser {
    fn username_for(&self, spec: &ProviderSpec) -> Result<String> {
        let machine_spec =
            machine_spec_from_provider_spec(spec).context("decoding OpenStack machine spec")?;
        anyhow::ensure!(
            !machine_spec.ssh_user_name.is_empty(),
            "OpenStack machine spec has no sshUserName"
        );
        Ok(machine_spec.ssh_user_name)
    }
}
