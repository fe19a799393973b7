use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name under which the OpenStack deployment client is known to callers.
pub const PROVIDER_NAME: &str = "openstack";

/// Annotation carrying the node's reachable address.
pub const IP_ANNOTATION_KEY: &str = "openstack-ip-address";

/// Annotation carrying the OpenStack server id backing the node.
pub const RESOURCE_ID_ANNOTATION_KEY: &str = "openstack-resourceId";

/// Free-form string annotations attached to a machine.
pub type Annotations = BTreeMap<String, String>;

/// Object metadata of a machine resource.
///
/// `annotations` is `None` when the manifest carries no annotation block at
/// all, which is distinct from an empty map.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<Annotations>,
}

/// Opaque provider-specific blob attached to a machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// Desired state of a machine. Only the provider spec is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    #[serde(default)]
    pub provider_spec: ProviderSpec,
}

/// A cluster machine manifest, as read from YAML or JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: MachineSpec,
}

impl Machine {
    /// Annotations of this machine, if any were declared.
    #[must_use]
    pub fn annotations(&self) -> Option<&Annotations> {
        self.metadata.annotations.as_ref()
    }
}
