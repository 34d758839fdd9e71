use std::sync::Arc;
use std::time::{Duration, Instant};

use kubestatus_k8s::{
    ClusterFacade, ClusterSource, HealthState, KubeSource, NamespaceScope, QueryError,
    QueryOptions,
};

/// A local port with nothing listening on it
fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn unreachable_source(timeout: Duration) -> KubeSource {
    let url = format!("http://127.0.0.1:{}", closed_port());
    let mut config = kube::Config::new(url.parse().unwrap());
    config.connect_timeout = Some(timeout);
    config.read_timeout = Some(timeout);
    let client = kube::Client::try_from(config).unwrap();
    KubeSource::new(
        client,
        QueryOptions {
            timeout,
            ..Default::default()
        },
    )
}

#[tokio::test]
async fn test_health_reports_unreachable_within_bound() {
    let timeout = Duration::from_secs(2);
    let facade = ClusterFacade::new(Arc::new(unreachable_source(timeout)));

    let started = Instant::now();
    let health = facade.health().await;

    assert_eq!(health.status, HealthState::Unreachable);
    assert!(!health.kubernetes_api);
    // One attempt plus one retry
    assert!(started.elapsed() < timeout * 2 + Duration::from_secs(1));
}

#[tokio::test]
async fn test_listing_fails_as_transport_error() {
    let source = unreachable_source(Duration::from_secs(2));

    let err = source.pods(&NamespaceScope::All).await.unwrap_err();
    assert!(matches!(err, QueryError::Transport(_) | QueryError::Timeout(_)));
    assert!(!err.answered());
}
