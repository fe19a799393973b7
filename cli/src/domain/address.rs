//! Reachable-address lookup from machine annotations.

use nodeboot_common::{Annotations, IP_ANNOTATION_KEY, RESOURCE_ID_ANNOTATION_KEY};

use crate::domain::error::FetchError;

/// Returns the node's reachable address from its annotations.
///
/// The value is returned verbatim. A missing annotation map and a missing
/// key are both `NotFound`.
///
/// # Errors
///
/// Returns [`FetchError::NotFound`] if the address annotation is absent.
pub fn resolve_address(annotations: Option<&Annotations>) -> Result<String, FetchError> {
    let ip = annotations
        .and_then(|a| a.get(IP_ANNOTATION_KEY))
        .ok_or(FetchError::NotFound)?;
    tracing::info!(address = %ip, "returning IP from machine annotation");
    Ok(ip.clone())
}

/// Returns the OpenStack resource id annotation, if set.
#[must_use]
pub fn resolve_resource_id(annotations: Option<&Annotations>) -> Option<String> {
    annotations
        .and_then(|a| a.get(RESOURCE_ID_ANNOTATION_KEY))
        .cloned()
}
