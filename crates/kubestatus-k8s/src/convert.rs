//! Mapping from k8s-openapi objects to the fixed-field response records

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod};

use kubestatus_types::{
    DeploymentInfo, NodeCapacity, NodeInfo, NodeReadiness, PodInfo, PodPhase, UNKNOWN,
};

const INSTANCE_TYPE_LABELS: [&str; 2] = [
    "node.kubernetes.io/instance-type",
    "beta.kubernetes.io/instance-type",
];
const ZONE_LABEL: &str = "topology.kubernetes.io/zone";
const NODEPOOL_LABELS: [&str; 2] = ["karpenter.sh/nodepool", "karpenter.sh/provisioner-name"];

pub fn namespace_name(ns: Namespace) -> String {
    ns.metadata.name.unwrap_or_default()
}

/// Convert a k8s Node to NodeInfo
pub fn node_info(node: Node) -> NodeInfo {
    let mut info = NodeInfo::new(node.metadata.name.unwrap_or_default());

    if let Some(labels) = &node.metadata.labels {
        info.instance_type = first_label(labels, &INSTANCE_TYPE_LABELS)
            .unwrap_or(UNKNOWN)
            .to_string();
        info.zone = first_label(labels, &[ZONE_LABEL])
            .unwrap_or(UNKNOWN)
            .to_string();
        info.nodepool = first_label(labels, &NODEPOOL_LABELS).map(str::to_string);
    }

    if let Some(status) = node.status {
        info.status = status
            .conditions
            .unwrap_or_default()
            .iter()
            .find(|c| c.type_ == "Ready")
            .map(|c| NodeReadiness::from_condition_status(&c.status))
            .unwrap_or(NodeReadiness::Unknown);

        if let Some(capacity) = status.capacity {
            info.capacity = Some(NodeCapacity {
                cpu: capacity.get("cpu").map(|q| q.0.clone()),
                memory: capacity.get("memory").map(|q| q.0.clone()),
                pods: capacity.get("pods").map(|q| q.0.clone()),
            });
        }
    }

    info
}

fn first_label<'a>(labels: &'a BTreeMap<String, String>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| labels.get(*key))
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Convert a k8s Pod to PodInfo
pub fn pod_info(pod: Pod) -> PodInfo {
    let mut info = PodInfo::new(
        pod.metadata.name.unwrap_or_default(),
        pod.metadata.namespace.unwrap_or_default(),
    );

    if let Some(spec) = &pod.spec {
        info.node = spec.node_name.clone();
    }

    if let Some(status) = pod.status {
        info.phase = status
            .phase
            .as_deref()
            .map(PodPhase::from)
            .unwrap_or(PodPhase::Unknown);

        info.ready = status
            .conditions
            .unwrap_or_default()
            .iter()
            .any(|c| c.type_ == "Ready" && c.status == "True");

        info.restarts = status
            .container_statuses
            .unwrap_or_default()
            .iter()
            .map(|cs| non_negative(cs.restart_count))
            .fold(0u32, u32::saturating_add);
    }

    info
}

/// Convert a k8s Deployment to DeploymentInfo
pub fn deployment_info(deploy: Deployment) -> DeploymentInfo {
    let mut info = DeploymentInfo::new(
        deploy.metadata.name.unwrap_or_default(),
        deploy.metadata.namespace.unwrap_or_default(),
    );

    if let Some(spec) = deploy.spec {
        info.replicas = non_negative(spec.replicas.unwrap_or(0));
    }

    if let Some(status) = deploy.status {
        info.available_replicas = non_negative(status.available_replicas.unwrap_or(0));
        info.ready_replicas = non_negative(status.ready_replicas.unwrap_or(0));
    }

    info
}

fn non_negative(n: i32) -> u32 {
    u32::try_from(n).unwrap_or(0)
}
