use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use kubestatus_api::{AppState, build_router};
use kubestatus_k8s::fixture::{ClusterSnapshot, StaticSource};
use kubestatus_k8s::{ClusterFacade, DeploymentInfo, NodeInfo, PodInfo};
use kubestatus_types::{NodeReadiness, PodPhase};

fn app(source: StaticSource) -> Router {
    build_router(AppState::new(ClusterFacade::new(Arc::new(source))))
}

fn ready_node(name: &str) -> NodeInfo {
    let mut node = NodeInfo::new(name.to_string());
    node.status = NodeReadiness::Ready;
    node.instance_type = "t3.medium".to_string();
    node
}

fn running_pod(name: &str, namespace: &str) -> PodInfo {
    let mut pod = PodInfo::new(name.to_string(), namespace.to_string());
    pod.phase = PodPhase::Running;
    pod
}

fn deployment(name: &str, namespace: &str, replicas: u32, available: u32) -> DeploymentInfo {
    let mut d = DeploymentInfo::new(name.to_string(), namespace.to_string());
    d.replicas = replicas;
    d.ready_replicas = available;
    d.available_replicas = available;
    d
}

/// 3 namespaces, 2 ready nodes, one running pod in `mcp-server`
fn small_cluster() -> StaticSource {
    StaticSource::new(ClusterSnapshot {
        namespaces: vec!["default".into(), "kube-system".into(), "mcp-server".into()],
        nodes: vec![ready_node("ip-10-0-1-5"), ready_node("ip-10-0-2-7")],
        pods: vec![running_pod("mcp-server-xyz", "mcp-server")],
        deployments: vec![deployment("mcp-server", "mcp-server", 1, 1)],
    })
}

/// Pods and deployments spread over two namespaces
fn busy_cluster() -> StaticSource {
    let mut karpenter = ready_node("ip-10-0-3-9");
    karpenter.nodepool = Some("default".into());

    StaticSource::new(ClusterSnapshot {
        namespaces: vec!["default".into(), "karpenter".into(), "web".into()],
        nodes: vec![ready_node("ip-10-0-1-5"), karpenter],
        pods: vec![
            running_pod("web-1", "web"),
            running_pod("web-2", "web"),
            running_pod("karpenter-abc", "karpenter"),
        ],
        deployments: vec![
            deployment("web", "web", 2, 2),
            deployment("karpenter", "karpenter", 2, 3),
        ],
    })
}

async fn send(app: &Router, method: Method, uri: &str) -> (StatusCode, Option<String>, Value) {
    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = res.status();
    let content_type = res
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(res.into_body(), 64 * 1024).await.unwrap();
    let value = serde_json::from_slice(&body).unwrap();
    (status, content_type, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, value) = send(app, Method::GET, uri).await;
    (status, value)
}

fn assert_count_matches(body: &Value, count: &str, list: &str) {
    let items = body[list].as_array().expect("list field is an array");
    assert_eq!(body[count].as_u64(), Some(items.len() as u64), "{body}");
}

#[tokio::test]
async fn test_small_cluster_scenario() {
    let app = app(small_cluster());

    let (status, body) = get(&app, "/cluster-info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["namespace_count"], 3);
    assert_eq!(body["reachable"], true);

    let (status, body) = get(&app, "/nodes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["node_count"], 2);
    assert!(
        body["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .all(|n| n["status"] == "Ready")
    );

    let (status, body) = get(&app, "/pods?namespace=mcp-server").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pod_count"], 1);
    let pod = &body["pods"][0];
    assert_eq!(pod["name"], "mcp-server-xyz");
    assert_eq!(pod["namespace"], "mcp-server");
    assert_eq!(pod["phase"], "Running");
    assert_eq!(pod["restarts"], 0);
}

#[tokio::test]
async fn test_counts_match_list_lengths() {
    let app = app(busy_cluster());

    for (uri, count, list) in [
        ("/nodes", "node_count", "nodes"),
        ("/nodes?karpenter_only=true", "node_count", "nodes"),
        ("/pods", "pod_count", "pods"),
        ("/pods?namespace=web", "pod_count", "pods"),
        ("/deployments", "deployment_count", "deployments"),
        ("/deployments?namespace=karpenter", "deployment_count", "deployments"),
        ("/cluster-info?include_nodes=true", "node_count", "nodes"),
        ("/cluster-info", "namespace_count", "namespaces"),
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_count_matches(&body, count, list);
    }
}

#[tokio::test]
async fn test_pod_scoping() {
    let app = app(busy_cluster());

    let (_, all) = get(&app, "/pods").await;
    assert_eq!(all["pod_count"], 3);
    assert_eq!(all["namespace"], Value::Null);

    let (_, web) = get(&app, "/pods?namespace=web").await;
    assert_eq!(web["pod_count"], 2);
    assert_eq!(web["namespace"], "web");
    assert!(
        web["pods"]
            .as_array()
            .unwrap()
            .iter()
            .all(|p| p["namespace"] == "web")
    );

    let (_, karpenter) = get(&app, "/pods?namespace=karpenter").await;
    assert_eq!(karpenter["pod_count"], 1);

    // An empty filter lists everything
    let (_, empty) = get(&app, "/pods?namespace=").await;
    assert_eq!(empty["pod_count"], 3);
}

#[tokio::test]
async fn test_deployment_scoping() {
    let app = app(busy_cluster());

    let (_, body) = get(&app, "/deployments?namespace=karpenter").await;
    assert_eq!(body["deployment_count"], 1);
    let d = &body["deployments"][0];
    assert_eq!(d["name"], "karpenter");
    assert_eq!(d["replicas"], 2);
    assert_eq!(d["available_replicas"], 3);

    let (_, body) = get(&app, "/deployments").await;
    assert_eq!(body["deployment_count"], 2);
}

#[tokio::test]
async fn test_nonexistent_namespace_is_empty() {
    let app = app(busy_cluster());

    let (status, body) = get(&app, "/pods?namespace=does-not-exist").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"namespace": "does-not-exist", "pod_count": 0, "pods": []})
    );

    let (status, body) = get(&app, "/deployments?namespace=does-not-exist").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deployment_count"], 0);
    assert_eq!(body["deployments"], json!([]));
}

#[tokio::test]
async fn test_empty_cluster_has_zero_counts() {
    let app = app(StaticSource::new(ClusterSnapshot::default()));

    let (_, body) = get(&app, "/cluster-info").await;
    assert_eq!(
        body,
        json!({"namespace_count": 0, "reachable": true, "namespaces": []})
    );

    let (_, body) = get(&app, "/nodes").await;
    assert_eq!(body, json!({"node_count": 0, "nodes": []}));

    let (_, body) = get(&app, "/pods").await;
    assert_eq!(body, json!({"namespace": null, "pod_count": 0, "pods": []}));

    let (_, body) = get(&app, "/deployments").await;
    assert_eq!(
        body,
        json!({"namespace": null, "deployment_count": 0, "deployments": []})
    );
}

#[tokio::test]
async fn test_karpenter_only_nodes() {
    let app = app(busy_cluster());

    let (_, body) = get(&app, "/nodes?karpenter_only=true").await;
    assert_eq!(body["node_count"], 1);
    assert_eq!(body["nodes"][0]["nodepool"], "default");
}

#[tokio::test]
async fn test_repeated_calls_are_identical() {
    let app = app(busy_cluster());

    for uri in ["/cluster-info?include_nodes=true", "/nodes", "/pods", "/deployments"] {
        let (_, first) = get(&app, uri).await;
        let (_, second) = get(&app, uri).await;
        assert_eq!(first, second, "{uri}");
    }

    let (_, first) = get(&app, "/health").await;
    let (_, second) = get(&app, "/health").await;
    assert_eq!(first["status"], second["status"]);
    assert_eq!(first["kubernetes_api"], second["kubernetes_api"]);
}

#[tokio::test]
async fn test_health_when_cluster_reachable() {
    let app = app(small_cluster());

    let (status, content_type, body) = send(&app, Method::GET, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["kubernetes_api"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_unreachable_cluster() {
    let app = app(StaticSource::unreachable());

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unreachable");
    assert_eq!(body["kubernetes_api"], false);

    for uri in ["/cluster-info", "/nodes", "/pods", "/deployments?namespace=web"] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body, json!({"error": "kubernetes api unreachable"}));
    }
}

#[tokio::test]
async fn test_forbidden_cluster_is_degraded() {
    let app = app(StaticSource::forbidden());

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["kubernetes_api"], false);

    // RBAC detail is not echoed to the client
    let (status, body) = get(&app, "/pods").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body, json!({"error": "kubernetes api unreachable"}));
}

#[tokio::test]
async fn test_invalid_namespace_is_bad_request() {
    let app = app(busy_cluster());

    for uri in [
        "/pods?namespace=Bad_Name",
        "/pods?namespace=..%2Fetc",
        "/deployments?namespace=-web",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].as_str().unwrap().contains("namespace"), "{body}");
    }
}

#[tokio::test]
async fn test_malformed_flag_is_bad_request() {
    let app = app(busy_cluster());

    let (status, body) = get(&app, "/cluster-info?include_nodes=maybe").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let app = app(small_cluster());

    let (status, content_type, body) = send(&app, Method::GET, "/secrets").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body, json!({"error": "not found"}));
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let app = app(small_cluster());

    let (status, _, body) = send(&app, Method::DELETE, "/pods").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({"error": "method not allowed"}));
}

#[tokio::test]
async fn test_concurrent_requests() {
    let app = app(busy_cluster());

    let requests = (0..32).map(|i| {
        let app = app.clone();
        let uri = match i % 4 {
            0 => "/nodes",
            1 => "/pods?namespace=web",
            2 => "/deployments",
            _ => "/health",
        };
        tokio::spawn(async move { get(&app, uri).await })
    });

    for result in futures::future::join_all(requests).await {
        let (status, _) = result.unwrap();
        assert_eq!(status, StatusCode::OK);
    }
}
