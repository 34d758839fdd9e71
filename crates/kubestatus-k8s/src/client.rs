//! Credential resolution
//!
//! Whether the service authenticates with its pod's service account or
//! with a local kubeconfig is decided once at startup. Everything after
//! that only sees a `ClusterSource`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use kube::config::KubeConfigOptions;
use serde::Deserialize;

use crate::{ClusterSource, DisconnectedSource, KubeSource, QueryOptions};

/// Env var the kubelet injects into every pod
const SERVICE_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";

/// How to find credentials for the Kubernetes API
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialMode {
    /// In-cluster when running in a pod, kubeconfig otherwise
    #[default]
    Auto,
    InCluster,
    Kubeconfig,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown credential mode '{0}', expected auto, in-cluster or kubeconfig")]
pub struct UnknownCredentialMode(String);

impl FromStr for CredentialMode {
    type Err = UnknownCredentialMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "in-cluster" => Ok(Self::InCluster),
            "kubeconfig" => Ok(Self::Kubeconfig),
            other => Err(UnknownCredentialMode(other.to_string())),
        }
    }
}

impl fmt::Display for CredentialMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::InCluster => "in-cluster",
            Self::Kubeconfig => "kubeconfig",
        })
    }
}

impl CredentialMode {
    /// Settle `Auto` using whether the service host env var is present
    pub fn resolve(self, in_pod: bool) -> Self {
        match self {
            Self::Auto if in_pod => Self::InCluster,
            Self::Auto => Self::Kubeconfig,
            explicit => explicit,
        }
    }
}

/// Produces an authenticated client
#[async_trait]
pub trait ClientProvider: Send + Sync {
    /// Short label for logs
    fn describe(&self) -> String;

    async fn load_config(&self) -> Result<kube::Config>;

    /// Build a client whose connections are bounded by the query timeout
    async fn client(&self, options: &QueryOptions) -> Result<kube::Client> {
        let mut config = self.load_config().await?;
        config.connect_timeout = Some(options.timeout);
        config.read_timeout = Some(options.timeout);
        kube::Client::try_from(config)
            .with_context(|| format!("Failed to create client from {}", self.describe()))
    }
}

/// Service account token and CA mounted into the pod
pub struct InClusterProvider;

#[async_trait]
impl ClientProvider for InClusterProvider {
    fn describe(&self) -> String {
        "in-cluster service account".to_string()
    }

    async fn load_config(&self) -> Result<kube::Config> {
        kube::Config::incluster().context("Failed to load in-cluster config")
    }
}

/// Local kubeconfig, optionally pinned to a context
pub struct KubeconfigProvider {
    context: Option<String>,
}

impl KubeconfigProvider {
    pub fn new(context: Option<String>) -> Self {
        Self { context }
    }
}

#[async_trait]
impl ClientProvider for KubeconfigProvider {
    fn describe(&self) -> String {
        match &self.context {
            Some(context) => format!("kubeconfig context '{}'", context),
            None => "kubeconfig current context".to_string(),
        }
    }

    async fn load_config(&self) -> Result<kube::Config> {
        let options = KubeConfigOptions {
            context: self.context.clone(),
            ..Default::default()
        };
        kube::Config::from_kubeconfig(&options)
            .await
            .context("Failed to read kubeconfig. Is kubectl configured?")
    }
}

/// Pick the provider for a credential mode
pub fn select_provider(mode: CredentialMode, context: Option<String>) -> Box<dyn ClientProvider> {
    let in_pod = std::env::var_os(SERVICE_HOST_ENV).is_some();
    match mode.resolve(in_pod) {
        CredentialMode::InCluster => Box::new(InClusterProvider),
        _ => Box::new(KubeconfigProvider::new(context)),
    }
}

/// Build the cluster source for the service.
///
/// Never fails: without usable credentials the service still starts and
/// reports the cluster as unreachable.
pub async fn connect(provider: &dyn ClientProvider, options: QueryOptions) -> Arc<dyn ClusterSource> {
    match provider.client(&options).await {
        Ok(client) => {
            tracing::info!(credentials = %provider.describe(), "kubernetes client ready");
            Arc::new(KubeSource::new(client, options))
        }
        Err(e) => {
            tracing::warn!(credentials = %provider.describe(), error = %format!("{:#}", e), "could not build kubernetes client");
            Arc::new(DisconnectedSource::new(format!("{:#}", e)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_resolution() {
        assert_eq!(CredentialMode::Auto.resolve(true), CredentialMode::InCluster);
        assert_eq!(CredentialMode::Auto.resolve(false), CredentialMode::Kubeconfig);
        assert_eq!(
            CredentialMode::Kubeconfig.resolve(true),
            CredentialMode::Kubeconfig
        );
        assert_eq!(
            CredentialMode::InCluster.resolve(false),
            CredentialMode::InCluster
        );
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("in-cluster".parse::<CredentialMode>().unwrap(), CredentialMode::InCluster);
        assert_eq!("kubeconfig".parse::<CredentialMode>().unwrap(), CredentialMode::Kubeconfig);
        assert!("incluster".parse::<CredentialMode>().is_err());
        assert_eq!(CredentialMode::InCluster.to_string(), "in-cluster");
    }

    #[test]
    fn test_explicit_kubeconfig_provider() {
        let provider = select_provider(CredentialMode::Kubeconfig, Some("staging".into()));
        assert_eq!(provider.describe(), "kubeconfig context 'staging'");
    }

    struct FailingProvider;

    #[async_trait]
    impl ClientProvider for FailingProvider {
        fn describe(&self) -> String {
            "nothing".to_string()
        }

        async fn load_config(&self) -> Result<kube::Config> {
            anyhow::bail!("no credentials here")
        }
    }

    #[tokio::test]
    async fn test_connect_without_credentials_stays_up() {
        let source = connect(&FailingProvider, QueryOptions::default()).await;
        let err = source.probe().await.unwrap_err();
        assert!(matches!(err, crate::QueryError::NoClient(ref reason) if reason.contains("no credentials here")));
    }
}
