//! Shared types for kubestatus
//!
//! Fixed-field records that the HTTP surface serializes. The Kubernetes
//! adapter maps upstream objects into these so the response contract does
//! not move with API version drift.

mod scope;

pub use scope::{InvalidNamespace, NamespaceScope};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Kubernetes Resource Types
// ============================================================================

/// Readiness of a node, taken from its `Ready` condition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeReadiness {
    Ready,
    NotReady,
    Unknown,
}

impl NodeReadiness {
    /// Map a condition status string ("True"/"False"/"Unknown")
    pub fn from_condition_status(status: &str) -> Self {
        match status {
            "True" => Self::Ready,
            "False" => Self::NotReady,
            _ => Self::Unknown,
        }
    }
}

/// Raw capacity quantities reported by the kubelet
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeCapacity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pods: Option<String>,
}

/// Node information
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub name: String,
    pub status: NodeReadiness,
    pub instance_type: String,
    pub zone: String,
    /// Karpenter nodepool that provisioned this node, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodepool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<NodeCapacity>,
}

impl NodeInfo {
    pub fn new(name: String) -> Self {
        Self {
            name,
            status: NodeReadiness::Unknown,
            instance_type: UNKNOWN.to_string(),
            zone: UNKNOWN.to_string(),
            nodepool: None,
            capacity: None,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == NodeReadiness::Ready
    }
}

/// Placeholder for labels a node does not carry
pub const UNKNOWN: &str = "unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl From<&str> for PodPhase {
    fn from(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Running" => Self::Running,
            "Succeeded" => Self::Succeeded,
            "Failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Pod information
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodInfo {
    pub name: String,
    pub namespace: String,
    pub phase: PodPhase,
    /// Sum of restart counts across all containers
    pub restarts: u32,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
}

impl PodInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            phase: PodPhase::Unknown,
            restarts: 0,
            ready: false,
            node: None,
        }
    }
}

/// Deployment information
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentInfo {
    pub name: String,
    pub namespace: String,
    /// Desired replica count
    pub replicas: u32,
    pub ready_replicas: u32,
    pub available_replicas: u32,
}

impl DeploymentInfo {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            replicas: 0,
            ready_replicas: 0,
            available_replicas: 0,
        }
    }

    /// Format replica status as "ready/desired"
    pub fn replica_status(&self) -> String {
        format!("{}/{}", self.ready_replicas, self.replicas)
    }
}

// ============================================================================
// Response Envelopes
// ============================================================================
//
// Counts are derived from the sequences in the constructors and the fields
// are only readable through accessors, so `*_count` always matches.

/// Summary served by `/cluster-info`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSummary {
    namespace_count: usize,
    reachable: bool,
    namespaces: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    node_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nodes: Option<Vec<NodeInfo>>,
}

impl ClusterSummary {
    /// Summary of a cluster that answered a namespace listing
    pub fn new(mut namespaces: Vec<String>) -> Self {
        namespaces.sort();
        Self {
            namespace_count: namespaces.len(),
            reachable: true,
            namespaces,
            node_count: None,
            nodes: None,
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<NodeInfo>) -> Self {
        let nodes = sorted_nodes(nodes);
        self.node_count = Some(nodes.len());
        self.nodes = Some(nodes);
        self
    }

    pub fn namespace_count(&self) -> usize {
        self.namespace_count
    }

    pub fn reachable(&self) -> bool {
        self.reachable
    }

    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn nodes(&self) -> Option<&[NodeInfo]> {
        self.nodes.as_deref()
    }
}

/// Listing served by `/nodes`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeList {
    node_count: usize,
    nodes: Vec<NodeInfo>,
}

impl NodeList {
    pub fn count(&self) -> usize {
        self.node_count
    }

    pub fn nodes(&self) -> &[NodeInfo] {
        &self.nodes
    }
}

impl From<Vec<NodeInfo>> for NodeList {
    fn from(nodes: Vec<NodeInfo>) -> Self {
        let nodes = sorted_nodes(nodes);
        Self {
            node_count: nodes.len(),
            nodes,
        }
    }
}

fn sorted_nodes(mut nodes: Vec<NodeInfo>) -> Vec<NodeInfo> {
    nodes.sort_by(|a, b| a.name.cmp(&b.name));
    nodes
}

/// Listing served by `/pods`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodList {
    /// Namespace the listing was scoped to, `None` for all namespaces
    namespace: Option<String>,
    pod_count: usize,
    pods: Vec<PodInfo>,
}

impl PodList {
    pub fn new(scope: &NamespaceScope, mut pods: Vec<PodInfo>) -> Self {
        pods.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        Self {
            namespace: scope.name().map(str::to_string),
            pod_count: pods.len(),
            pods,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn count(&self) -> usize {
        self.pod_count
    }

    pub fn pods(&self) -> &[PodInfo] {
        &self.pods
    }
}

/// Listing served by `/deployments`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentList {
    namespace: Option<String>,
    deployment_count: usize,
    deployments: Vec<DeploymentInfo>,
}

impl DeploymentList {
    pub fn new(scope: &NamespaceScope, mut deployments: Vec<DeploymentInfo>) -> Self {
        deployments.sort_by(|a, b| (&a.namespace, &a.name).cmp(&(&b.namespace, &b.name)));
        Self {
            namespace: scope.name().map(str::to_string),
            deployment_count: deployments.len(),
            deployments,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn count(&self) -> usize {
        self.deployment_count
    }

    pub fn deployments(&self) -> &[DeploymentInfo] {
        &self.deployments
    }
}

// ============================================================================
// Health Types
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// The API answered the probe
    Healthy,
    /// The API answered, but refused the probe (auth, RBAC, server error)
    Degraded,
    /// The API could not be reached at all
    Unreachable,
}

/// Point-in-time health report served by `/health`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub kubernetes_api: bool,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn new(status: HealthState) -> Self {
        Self {
            status,
            kubernetes_api: status == HealthState::Healthy,
            timestamp: Utc::now(),
        }
    }
}
