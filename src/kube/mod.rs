//! Kubernetes client module
//!
//! Handles connection to the Kubernetes API server and provides the
//! read-only snapshot source the topology builder consumes.

pub mod snapshot;

use std::path::Path;

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};

pub use snapshot::{KubeSnapshotSource, SnapshotError, SnapshotSource};

/// Initialize and return a Kubernetes client.
///
/// With an explicit kubeconfig path the file is loaded as-is; otherwise the
/// default loading strategy applies:
/// 1. In-cluster config (if running in a pod)
/// 2. KUBECONFIG environment variable
/// 3. ~/.kube/config
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client> {
    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("failed to read kubeconfig at {}", path.display()))?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .context("failed to interpret kubeconfig")?
        }
        None => Config::infer()
            .await
            .context("failed to infer cluster configuration")?,
    };

    let client = Client::try_from(config).context("failed to create cluster client")?;
    Ok(client)
}
