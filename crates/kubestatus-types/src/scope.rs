use std::sync::LazyLock;

use regex::Regex;

/// DNS-1123 label, the format Kubernetes enforces for namespace names
static NAMESPACE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("valid regex"));

const MAX_NAMESPACE_LEN: usize = 63;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidNamespace {
    #[error("namespace must be at most {max} characters, got {0}", max = MAX_NAMESPACE_LEN)]
    TooLong(usize),
    #[error(
        "namespace '{0}' must consist of lowercase alphanumeric characters or '-', \
         and start and end with an alphanumeric character"
    )]
    Malformed(String),
}

/// Which namespaces a pod or deployment listing covers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NamespaceScope {
    All,
    Namespace(String),
}

impl NamespaceScope {
    /// Parse an optional `namespace` filter.
    ///
    /// Absent and empty filters both mean every namespace.
    pub fn parse(filter: Option<&str>) -> Result<Self, InvalidNamespace> {
        let Some(name) = filter.filter(|n| !n.is_empty()) else {
            return Ok(Self::All);
        };

        if name.len() > MAX_NAMESPACE_LEN {
            return Err(InvalidNamespace::TooLong(name.len()));
        }
        if !NAMESPACE_NAME.is_match(name) {
            return Err(InvalidNamespace::Malformed(name.to_string()));
        }

        Ok(Self::Namespace(name.to_string()))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Namespace(name) => Some(name),
        }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        match self {
            Self::All => true,
            Self::Namespace(name) => name == namespace,
        }
    }
}
