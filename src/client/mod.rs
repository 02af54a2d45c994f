//! Kubernetes client for node status operations.
//!
//! This module provides:
//! - `NodeClient`: the three node operations the reconciler needs
//! - `KubeNodeClient`: the kube-rs implementation
//! - Client construction from `--kubeconfig` / `--master`
//! - The two write strategies (`writer`) and patch generation (`patch`)

pub mod patch;
pub mod writer;

pub use writer::{apply_plan, change_node_condition, patch_node_status};

use std::path::PathBuf;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Node;
use kube::api::{Api, Patch, PatchParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use crate::error::{Error, Result};

/// Field manager name used for status writes
pub const FIELD_MANAGER: &str = "nodecon";

/// Node operations used by the change and delete flows.
///
/// The real implementation talks to the API server; tests substitute an
/// in-memory or mocked client.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Fetch a node by name.
    ///
    /// Returns [`Error::NodeNotFound`] if the node does not exist.
    async fn get_node(&self, name: &str) -> Result<Node>;

    /// Replace the node's status subresource with the status of `node`
    async fn replace_node_status(&self, node: &Node) -> Result<Node>;

    /// Send a strategic merge patch to the node's status subresource
    async fn patch_node_status(&self, name: &str, patch: &serde_json::Value) -> Result<Node>;
}

/// kube-rs backed [`NodeClient`]
pub struct KubeNodeClient {
    api: Api<Node>,
}

impl KubeNodeClient {
    /// Create a new client wrapping the given kube Client
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }
}

#[async_trait]
impl NodeClient for KubeNodeClient {
    async fn get_node(&self, name: &str) -> Result<Node> {
        self.api
            .get(name)
            .await
            .map_err(|e| Error::from_fetch(name, e))
    }

    async fn replace_node_status(&self, node: &Node) -> Result<Node> {
        let name = node
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| Error::Validation("node has no name".to_string()))?;

        let updated = self
            .api
            .replace_status(name, &post_params(), node)
            .await?;
        Ok(updated)
    }

    async fn patch_node_status(&self, name: &str, patch: &serde_json::Value) -> Result<Node> {
        debug!(node = %name, patch = %patch, "Sending strategic merge patch");
        let updated = self
            .api
            .patch_status(
                name,
                &patch_params(),
                &Patch::Strategic(patch),
            )
            .await?;
        Ok(updated)
    }
}

fn post_params() -> PostParams {
    PostParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..Default::default()
    }
}

fn patch_params() -> PatchParams {
    PatchParams {
        field_manager: Some(FIELD_MANAGER.to_string()),
        ..Default::default()
    }
}

/// Where the client configuration comes from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Explicit kubeconfig path
    pub kubeconfig: Option<PathBuf>,
    /// API server URL overriding the kubeconfig cluster
    pub master: Option<String>,
}

/// Build a kube client from the resolved configuration.
///
/// Without an explicit kubeconfig, [`Config::infer`] tries `KUBECONFIG`,
/// then `~/.kube/config`, then the in-cluster service account.
pub async fn create_client(options: &ClientOptions) -> Result<Client> {
    let mut config = match options.kubeconfig.as_deref() {
        Some(path) => {
            debug!(path = %path.display(), "Loading kubeconfig");
            let kubeconfig = Kubeconfig::read_from(path)
                .map_err(|e| Error::Config(format!("failed to read kubeconfig: {}", e)))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| Error::Config(format!("failed to load kubeconfig: {}", e)))?
        }
        None => Config::infer()
            .await
            .map_err(|e| Error::Config(format!("failed to infer config: {}", e)))?,
    };

    if let Some(master) = options.master.as_deref().filter(|m| !m.is_empty()) {
        config.cluster_url = master
            .parse::<http::Uri>()
            .map_err(|e| Error::Config(format!("invalid master URL '{}': {}", master, e)))?;
    }

    Client::try_from(config)
        .map_err(|e| Error::Config(format!("failed to create client: {}", e)))
}
