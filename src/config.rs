//! Runtime configuration
//!
//! Flags and env vars win over the optional TOML file, which wins over the
//! built-in defaults.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use clap::Parser;
use serde::Deserialize;

use kubestatus_k8s::{CredentialMode, DEFAULT_API_TIMEOUT, DEFAULT_PAGE_SIZE, QueryOptions};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BIND: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// kubestatus - read-only HTTP service reporting Kubernetes cluster health
#[derive(Parser, Debug, Default)]
#[command(name = "kubestatus")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Port to listen on [default: 8080]
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long, env = "BIND_ADDRESS")]
    pub bind: Option<IpAddr>,

    /// Upper bound on each Kubernetes API call, in seconds [default: 5]
    #[arg(long, env = "KUBE_API_TIMEOUT_SECS")]
    pub api_timeout_secs: Option<u64>,

    /// Objects requested per list page [default: 500]
    #[arg(long, env = "KUBE_PAGE_SIZE")]
    pub page_size: Option<u32>,

    /// Where credentials come from: auto, in-cluster or kubeconfig [default: auto]
    #[arg(long, env = "KUBE_CREDENTIALS")]
    pub credentials: Option<CredentialMode>,

    /// Kubeconfig context to use instead of the current one
    #[arg(long, env = "KUBE_CONTEXT")]
    pub context: Option<String>,

    /// Optional TOML file with the same settings
    #[arg(long, env = "KUBESTATUS_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Settings read from the TOML file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub bind: Option<IpAddr>,
    pub api_timeout_secs: Option<u64>,
    pub page_size: Option<u32>,
    pub credentials: Option<CredentialMode>,
    pub context: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub listen: SocketAddr,
    pub query: QueryOptions,
    pub credentials: CredentialMode,
    pub context: Option<String>,
}

impl Settings {
    /// Resolve settings from the command line, env and optional config file
    pub fn load(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(args, file)
    }

    pub fn resolve(args: Args, file: FileConfig) -> Result<Self> {
        let port = args.port.or(file.port).unwrap_or(DEFAULT_PORT);
        let bind = args.bind.or(file.bind).unwrap_or(DEFAULT_BIND);

        let timeout = args
            .api_timeout_secs
            .or(file.api_timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_API_TIMEOUT);
        ensure!(!timeout.is_zero(), "api timeout must be at least one second");

        let page_size = args.page_size.or(file.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
        ensure!(page_size > 0, "page size must be positive");

        Ok(Self {
            listen: SocketAddr::new(bind, port),
            query: QueryOptions { timeout, page_size },
            credentials: args.credentials.or(file.credentials).unwrap_or_default(),
            context: args.context.or(file.context),
        })
    }
}
