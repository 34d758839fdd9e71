//! In-memory cluster for tests and local runs without a cluster

use std::time::Duration;

use async_trait::async_trait;

use kubestatus_types::{DeploymentInfo, NamespaceScope, NodeInfo, PodInfo};

use crate::{ClusterSource, QueryError};

/// Fixed cluster state
#[derive(Clone, Debug, Default)]
pub struct ClusterSnapshot {
    pub namespaces: Vec<String>,
    pub nodes: Vec<NodeInfo>,
    pub pods: Vec<PodInfo>,
    pub deployments: Vec<DeploymentInfo>,
}

#[derive(Clone, Copy, Debug)]
enum Failure {
    Unreachable,
    Forbidden,
}

impl Failure {
    fn error(self) -> QueryError {
        match self {
            Self::Unreachable => QueryError::Timeout(Duration::from_secs(5)),
            Self::Forbidden => QueryError::Rejected {
                code: 403,
                reason: "Forbidden".to_string(),
                message: "serviceaccount cannot list resource".to_string(),
            },
        }
    }
}

/// ClusterSource that serves a snapshot, or fails every call
#[derive(Clone, Debug)]
pub struct StaticSource {
    snapshot: ClusterSnapshot,
    failure: Option<Failure>,
}

impl StaticSource {
    pub fn new(snapshot: ClusterSnapshot) -> Self {
        Self {
            snapshot,
            failure: None,
        }
    }

    /// Every call times out
    pub fn unreachable() -> Self {
        Self {
            snapshot: ClusterSnapshot::default(),
            failure: Some(Failure::Unreachable),
        }
    }

    /// Every call is refused by RBAC
    pub fn forbidden() -> Self {
        Self {
            snapshot: ClusterSnapshot::default(),
            failure: Some(Failure::Forbidden),
        }
    }

    fn check(&self) -> Result<(), QueryError> {
        match self.failure {
            Some(failure) => Err(failure.error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterSource for StaticSource {
    async fn namespaces(&self) -> Result<Vec<String>, QueryError> {
        self.check()?;
        Ok(self.snapshot.namespaces.clone())
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>, QueryError> {
        self.check()?;
        Ok(self.snapshot.nodes.clone())
    }

    async fn pods(&self, scope: &NamespaceScope) -> Result<Vec<PodInfo>, QueryError> {
        self.check()?;
        Ok(self
            .snapshot
            .pods
            .iter()
            .filter(|p| scope.contains(&p.namespace))
            .cloned()
            .collect())
    }

    async fn deployments(&self, scope: &NamespaceScope) -> Result<Vec<DeploymentInfo>, QueryError> {
        self.check()?;
        Ok(self
            .snapshot
            .deployments
            .iter()
            .filter(|d| scope.contains(&d.namespace))
            .cloned()
            .collect())
    }

    async fn probe(&self) -> Result<(), QueryError> {
        self.check()
    }
}
