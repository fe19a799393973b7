/// Outcome of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPayload {
    /// The admin kubeconfig text.
    Found(String),
    /// Nothing usable came back. Only produced under `OutputPolicy::Compatible`.
    Empty,
}

impl CredentialPayload {
    /// The kubeconfig text, or `""` for `Empty`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Found(s) => s,
            Self::Empty => "",
        }
    }

    /// `true` whenever the marker was seen exactly once, even if the file
    /// after it was blank.
    #[must_use]
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}
