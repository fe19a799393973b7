pub mod provider_spec;
pub mod types;

pub use provider_spec::{OpenstackMachineSpec, ProviderSpecError, machine_spec_from_provider_spec};
pub use types::*;
