//! OpenStack machine spec decoding.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProviderSpec;

/// Errors produced while decoding a provider spec.
#[derive(Debug, Error)]
pub enum ProviderSpecError {
    #[error("provider spec has no value")]
    Missing,

    #[error("cannot decode OpenStack provider spec: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The subset of the OpenStack provider spec that nodeboot understands.
///
/// Unknown fields are ignored so newer manifests still decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenstackMachineSpec {
    /// Login user for SSH access to the machine.
    pub ssh_user_name: String,
    pub flavor: String,
    pub image: String,
    pub key_name: String,
    pub availability_zone: String,
    pub cloud_name: String,
}

/// Decodes the OpenStack machine spec carried in `spec`.
pub fn machine_spec_from_provider_spec(
    spec: &ProviderSpec,
) -> Result<OpenstackMachineSpec, ProviderSpecError> {
    let value = spec.value.as_ref().ok_or(ProviderSpecError::Missing)?;
    Ok(OpenstackMachineSpec::deserialize(value)?)
}
