use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::Deserialize;

use kubestatus_k8s::NodeFilter;
use kubestatus_types::{
    ClusterSummary, DeploymentList, HealthStatus, NamespaceScope, NodeList, PodList,
};

use crate::AppState;
use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct ClusterInfoParams {
    #[serde(default)]
    pub include_nodes: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct NodeParams {
    #[serde(default)]
    pub karpenter_only: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct NamespaceParams {
    pub namespace: Option<String>,
}

impl NamespaceParams {
    fn scope(&self) -> ApiResult<NamespaceScope> {
        Ok(NamespaceScope::parse(self.namespace.as_deref())?)
    }
}

/// Liveness plus a live probe of the Kubernetes API; always 200
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.facade.health().await)
}

pub async fn cluster_info(
    State(state): State<AppState>,
    params: Result<Query<ClusterInfoParams>, QueryRejection>,
) -> ApiResult<Json<ClusterSummary>> {
    let Query(params) = params?;
    Ok(Json(state.facade.cluster_info(params.include_nodes).await?))
}

pub async fn nodes(
    State(state): State<AppState>,
    params: Result<Query<NodeParams>, QueryRejection>,
) -> ApiResult<Json<NodeList>> {
    let Query(params) = params?;
    let filter = NodeFilter {
        karpenter_only: params.karpenter_only,
    };
    Ok(Json(state.facade.list_nodes(filter).await?))
}

pub async fn pods(
    State(state): State<AppState>,
    params: Result<Query<NamespaceParams>, QueryRejection>,
) -> ApiResult<Json<PodList>> {
    let Query(params) = params?;
    let scope = params.scope()?;
    Ok(Json(state.facade.list_pods(&scope).await?))
}

pub async fn deployments(
    State(state): State<AppState>,
    params: Result<Query<NamespaceParams>, QueryRejection>,
) -> ApiResult<Json<DeploymentList>> {
    let Query(params) = params?;
    let scope = params.scope()?;
    Ok(Json(state.facade.list_deployments(&scope).await?))
}

pub async fn not_found() -> ApiError {
    ApiError::not_found()
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}
