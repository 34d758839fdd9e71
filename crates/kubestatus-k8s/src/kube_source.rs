use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Namespace, Node, Pod};
use kube::api::ListParams;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;

use kubestatus_types::{DeploymentInfo, NamespaceScope, NodeInfo, PodInfo};

use crate::{ClusterSource, QueryError, convert};

/// Default bound on a single Kubernetes API call
pub const DEFAULT_API_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of objects requested per list page
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Limits applied to every Kubernetes API call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryOptions {
    pub timeout: Duration,
    pub page_size: u32,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_API_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// ClusterSource backed by a live `kube::Client`
#[derive(Clone)]
pub struct KubeSource {
    client: kube::Client,
    options: QueryOptions,
}

impl KubeSource {
    pub fn new(client: kube::Client, options: QueryOptions) -> Self {
        Self { client, options }
    }

    /// Run one API call under the timeout, retrying once on a transient transport error
    async fn attempt<T, F, Fut>(&self, what: &'static str, mut call: F) -> Result<T, QueryError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = kube::Result<T>>,
    {
        let mut retried = false;
        loop {
            let err = match tokio::time::timeout(self.options.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => QueryError::from_kube(e),
                Err(_) => QueryError::Timeout(self.options.timeout),
            };

            if retried || !err.is_transient() {
                return Err(err);
            }
            tracing::debug!(what, error = %err, "retrying kubernetes api call");
            retried = true;
        }
    }

    /// List every object, following continue tokens
    async fn list_all<K>(&self, api: &Api<K>, what: &'static str) -> Result<Vec<K>, QueryError>
    where
        K: Clone + DeserializeOwned + Debug,
    {
        let page_size = self.options.page_size;
        let items = collect_pages(move |token: Option<String>| async move {
            let mut params = ListParams::default().limit(page_size);
            if let Some(token) = &token {
                params = params.continue_token(token);
            }
            let list = self.attempt(what, || api.list(&params)).await?;
            Ok(Page {
                items: list.items,
                next: list.metadata.continue_,
            })
        })
        .await?;

        tracing::debug!(what, count = items.len(), "listed");
        Ok(items)
    }

    /// List namespaced objects; a missing namespace lists as empty
    async fn list_scoped<K>(
        &self,
        scope: &NamespaceScope,
        what: &'static str,
    ) -> Result<Vec<K>, QueryError>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = match scope {
            NamespaceScope::All => Api::all(self.client.clone()),
            NamespaceScope::Namespace(ns) => Api::namespaced(self.client.clone(), ns),
        };

        match self.list_all(&api, what).await {
            Err(err) if err.is_not_found() && scope != &NamespaceScope::All => {
                tracing::debug!(what, namespace = ?scope.name(), "namespace not found, listing as empty");
                Ok(Vec::new())
            }
            other => other,
        }
    }
}

#[async_trait]
impl ClusterSource for KubeSource {
    async fn namespaces(&self) -> Result<Vec<String>, QueryError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let list = self.list_all(&api, "namespaces").await?;
        Ok(list.into_iter().map(convert::namespace_name).collect())
    }

    async fn nodes(&self) -> Result<Vec<NodeInfo>, QueryError> {
        let api: Api<Node> = Api::all(self.client.clone());
        let list = self.list_all(&api, "nodes").await?;
        Ok(list.into_iter().map(convert::node_info).collect())
    }

    async fn pods(&self, scope: &NamespaceScope) -> Result<Vec<PodInfo>, QueryError> {
        let list: Vec<Pod> = self.list_scoped(scope, "pods").await?;
        Ok(list.into_iter().map(convert::pod_info).collect())
    }

    async fn deployments(&self, scope: &NamespaceScope) -> Result<Vec<DeploymentInfo>, QueryError> {
        let list: Vec<Deployment> = self.list_scoped(scope, "deployments").await?;
        Ok(list.into_iter().map(convert::deployment_info).collect())
    }

    async fn probe(&self) -> Result<(), QueryError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        let params = ListParams::default().limit(1);
        self.attempt("probe", || api.list(&params)).await?;
        Ok(())
    }
}

/// One page of a list call
pub(crate) struct Page<T> {
    pub items: Vec<T>,
    /// Continue token; absent or empty on the last page
    pub next: Option<String>,
}

/// Drain a paginated listing
pub(crate) async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, QueryError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, QueryError>>,
{
    let mut items = Vec::new();
    let mut token = None;
    loop {
        let page = fetch(token.take()).await?;
        items.extend(page.items);
        match page.next {
            Some(next) if !next.is_empty() => token = Some(next),
            _ => return Ok(items),
        }
    }
}
