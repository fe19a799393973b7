//! Payload extraction from unstructured remote output.
//!
//! The remote command prints [`MARKER`] before reading the credential file.
//! Anything the login shell prints before it (motd, banners) is discarded.

/// Literal printed by the remote command immediately before the payload.
pub const MARKER: &str = "STARTFILE";

/// Absolute path of the cluster admin kubeconfig on a control-plane node.
pub const ADMIN_CONF_PATH: &str = "/etc/kubernetes/admin.conf";

/// Result of scanning remote output for the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The marker occurred exactly once; holds the trimmed text after it.
    Payload(String),
    /// The marker occurred zero or several times.
    Ambiguous { occurrences: usize },
}

impl Extraction {
    /// Returns the payload, discarding the ambiguity detail.
    #[must_use]
    pub fn into_payload(self) -> Option<String> {
        match self {
            Self::Payload(p) => Some(p),
            Self::Ambiguous { .. } => None,
        }
    }
}

/// Splits `raw` on `marker` and keeps the text after it.
///
/// Only a single occurrence counts as success. An empty marker never
/// matches.
#[must_use]
pub fn extract(raw: &str, marker: &str) -> Extraction {
    if marker.is_empty() {
        return Extraction::Ambiguous { occurrences: 0 };
    }
    let occurrences = raw.matches(marker).count();
    match raw.split_once(marker) {
        Some((_, after)) if occurrences == 1 => Extraction::Payload(after.trim().to_string()),
        _ => Extraction::Ambiguous { occurrences },
    }
}
