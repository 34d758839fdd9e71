//! Kubernetes client for kubestatus
//!
//! This crate resolves credentials, reads namespaces, nodes, pods and
//! deployments through the Kubernetes API, and shapes them into the
//! records served over HTTP.

mod client;
mod convert;
mod error;
mod facade;
pub mod fixture;
mod kube_source;
mod source;

pub use client::{
    ClientProvider, CredentialMode, InClusterProvider, KubeconfigProvider, UnknownCredentialMode,
    connect, select_provider,
};
pub use error::QueryError;
pub use facade::{ClusterFacade, NodeFilter};
pub use kube_source::{DEFAULT_API_TIMEOUT, DEFAULT_PAGE_SIZE, KubeSource, QueryOptions};
pub use source::{ClusterSource, DisconnectedSource};

// Re-export types that are used in our public API
pub use kubestatus_types::{
    ClusterSummary, DeploymentInfo, DeploymentList, HealthState, HealthStatus, NamespaceScope,
    NodeInfo, NodeList, PodInfo, PodList,
};
