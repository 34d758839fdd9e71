use async_trait::async_trait;

use kubestatus_types::{DeploymentInfo, NamespaceScope, NodeInfo, PodInfo};

use crate::QueryError;

/// Read-only view of a cluster's state
///
/// Implementations must be safe to call from many requests at once.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Names of every namespace
    async fn namespaces(&self) -> Result<Vec<String>, QueryError>;

    async fn nodes(&self) -> Result<Vec<NodeInfo>, QueryError>;

    /// Pods in scope. A namespace that does not exist yields no pods.
    async fn pods(&self, scope: &NamespaceScope) -> Result<Vec<PodInfo>, QueryError>;

    /// Deployments in scope, with the same semantics as `pods`
    async fn deployments(&self, scope: &NamespaceScope) -> Result<Vec<DeploymentInfo>, QueryError>;

    /// Cheapest call that proves the API is reachable and accepts our credentials
    async fn probe(&self) -> Result<(), QueryError>;
}

/// Stand-in used when no client could be built at startup
#[derive(Debug, Clone)]
pub struct DisconnectedSource {
    reason: String,
}

impl DisconnectedSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> QueryError {
        QueryError::NoClient(self.reason.clone())
    }
}

#[async_trait]
impl ClusterSource for DisconnectedSource {
    async fn namespaces(&self) -> Result<Vec<String>, QueryError> {
        Err(self.error())
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>, QueryError> {
        Err(self.error())
    }

    async fn pods(&self, _scope: &NamespaceScope) -> Result<Vec<PodInfo>, QueryError> {
        Err(self.error())
    }

    async fn deployments(&self, _scope: &NamespaceScope) -> Result<Vec<DeploymentInfo>, QueryError> {
        Err(self.error())
    }

    async fn probe(&self) -> Result<(), QueryError> {
        Err(self.error())
    }
}
