use std::sync::Arc;

use kubestatus_types::{
    ClusterSummary, DeploymentList, HealthState, HealthStatus, NamespaceScope, NodeList, PodList,
};

use crate::{ClusterSource, QueryError};

/// Which nodes a node listing keeps
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NodeFilter {
    /// Only nodes provisioned by Karpenter
    pub karpenter_only: bool,
}

/// Turns cluster reads into the summarized response shapes
#[derive(Clone)]
pub struct ClusterFacade {
    source: Arc<dyn ClusterSource>,
}

impl ClusterFacade {
    pub fn new(source: Arc<dyn ClusterSource>) -> Self {
        Self { source }
    }

    pub async fn cluster_info(&self, include_nodes: bool) -> Result<ClusterSummary, QueryError> {
        if !include_nodes {
            return Ok(ClusterSummary::new(self.source.namespaces().await?));
        }

        let (namespaces, nodes) = tokio::try_join!(self.source.namespaces(), self.source.nodes())?;
        Ok(ClusterSummary::new(namespaces).with_nodes(nodes))
    }

    pub async fn list_nodes(&self, filter: NodeFilter) -> Result<NodeList, QueryError> {
        let mut nodes = self.source.nodes().await?;
        if filter.karpenter_only {
            nodes.retain(|n| n.nodepool.is_some());
        }
        Ok(NodeList::from(nodes))
    }

    pub async fn list_pods(&self, scope: &NamespaceScope) -> Result<PodList, QueryError> {
        let mut pods = self.source.pods(scope).await?;
        pods.retain(|p| scope.contains(&p.namespace));
        Ok(PodList::new(scope, pods))
    }

    pub async fn list_deployments(&self, scope: &NamespaceScope) -> Result<DeploymentList, QueryError> {
        let mut deployments = self.source.deployments(scope).await?;
        deployments.retain(|d| scope.contains(&d.namespace));
        Ok(DeploymentList::new(scope, deployments))
    }

    /// Probe the API. Never fails; failures are part of the report.
    pub async fn health(&self) -> HealthStatus {
        let state = match self.source.probe().await {
            Ok(()) => HealthState::Healthy,
            Err(err) => {
                tracing::warn!(error = %err, "kubernetes api probe failed");
                if err.answered() {
                    HealthState::Degraded
                } else {
                    HealthState::Unreachable
                }
            }
        };
        HealthStatus::new(state)
    }
}
