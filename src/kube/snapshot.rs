//! Snapshot source: the read-only view of cluster state
//!
//! The topology builder never talks to the Kubernetes API directly; it goes
//! through [`SnapshotSource`], which supplies per-namespace listings and
//! named gets. The production implementation wraps a [`kube::Client`] with
//! typed resources; tests drive the builder with an in-memory fake. All
//! operations are list/get — nothing here ever writes to the cluster.

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use kube::api::ListParams;
use kube::{Api, Client};
use thiserror::Error;

/// Errors surfaced by a snapshot source, classified by blast radius.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// A list call for one resource kind failed. Top-level listings abort
    /// the current namespace; listings consulted for the service cross-join
    /// or the autoscaler/disruption-budget lookups only skip that kind.
    #[error("failed to list {kind} in namespace {namespace}: {source}")]
    Listing {
        namespace: String,
        kind: &'static str,
        #[source]
        source: kube::Error,
    },

    /// A named get found nothing. The corresponding node or edge is omitted
    /// from the graph.
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        namespace: String,
        kind: &'static str,
        name: String,
    },

    /// A named get failed for a reason other than absence.
    #[error("failed to get {kind} {namespace}/{name}: {source}")]
    Resolution {
        namespace: String,
        kind: &'static str,
        name: String,
        #[source]
        source: kube::Error,
    },
}

/// Read-only provider of current cluster object listings for one namespace.
#[async_trait]
pub trait SnapshotSource {
    async fn get_namespace(&self, name: &str) -> Result<Namespace, SnapshotError>;
    async fn list_ingresses(&self, namespace: &str) -> Result<Vec<Ingress>, SnapshotError>;
    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, SnapshotError>;
    async fn list_stateful_sets(&self, namespace: &str)
    -> Result<Vec<StatefulSet>, SnapshotError>;
    async fn list_daemon_sets(&self, namespace: &str) -> Result<Vec<DaemonSet>, SnapshotError>;
    async fn list_autoscalers(
        &self,
        namespace: &str,
    ) -> Result<Vec<HorizontalPodAutoscaler>, SnapshotError>;
    async fn list_disruption_budgets(
        &self,
        namespace: &str,
    ) -> Result<Vec<PodDisruptionBudget>, SnapshotError>;
    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, SnapshotError>;
    async fn get_config_map(&self, namespace: &str, name: &str)
    -> Result<ConfigMap, SnapshotError>;
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, SnapshotError>;
}

fn listing_error(namespace: &str, kind: &'static str, source: kube::Error) -> SnapshotError {
    SnapshotError::Listing {
        namespace: namespace.to_string(),
        kind,
        source,
    }
}

fn get_error(namespace: &str, kind: &'static str, name: &str, source: kube::Error) -> SnapshotError {
    if matches!(&source, kube::Error::Api(response) if response.code == 404) {
        SnapshotError::NotFound {
            namespace: namespace.to_string(),
            kind,
            name: name.to_string(),
        }
    } else {
        SnapshotError::Resolution {
            namespace: namespace.to_string(),
            kind,
            name: name.to_string(),
            source,
        }
    }
}

/// Snapshot source backed by the live cluster API.
#[derive(Clone)]
pub struct KubeSnapshotSource {
    client: Client,
}

impl KubeSnapshotSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SnapshotSource for KubeSnapshotSource {
    async fn get_namespace(&self, name: &str) -> Result<Namespace, SnapshotError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.get(name)
            .await
            .map_err(|e| get_error(name, "Namespace", name, e))
    }

    async fn list_ingresses(&self, namespace: &str) -> Result<Vec<Ingress>, SnapshotError> {
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| listing_error(namespace, "Ingress", e))?;
        Ok(list.items)
    }

    async fn list_deployments(&self, namespace: &str) -> Result<Vec<Deployment>, SnapshotError> {
        let api: Api<Deployment> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| listing_error(namespace, "Deployment", e))?;
        Ok(list.items)
    }

    async fn list_stateful_sets(
        &self,
        namespace: &str,
    ) -> Result<Vec<StatefulSet>, SnapshotError> {
        let api: Api<StatefulSet> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| listing_error(namespace, "StatefulSet", e))?;
        Ok(list.items)
    }

    async fn list_daemon_sets(&self, namespace: &str) -> Result<Vec<DaemonSet>, SnapshotError> {
        let api: Api<DaemonSet> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| listing_error(namespace, "DaemonSet", e))?;
        Ok(list.items)
    }

    async fn list_autoscalers(
        &self,
        namespace: &str,
    ) -> Result<Vec<HorizontalPodAutoscaler>, SnapshotError> {
        let api: Api<HorizontalPodAutoscaler> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| listing_error(namespace, "HorizontalPodAutoscaler", e))?;
        Ok(list.items)
    }

    async fn list_disruption_budgets(
        &self,
        namespace: &str,
    ) -> Result<Vec<PodDisruptionBudget>, SnapshotError> {
        let api: Api<PodDisruptionBudget> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .map_err(|e| listing_error(namespace, "PodDisruptionBudget", e))?;
        Ok(list.items)
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, SnapshotError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| get_error(namespace, "Service", name, e))
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ConfigMap, SnapshotError> {
        let api: Api<ConfigMap> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| get_error(namespace, "ConfigMap", name, e))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, SnapshotError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| get_error(namespace, "Secret", name, e))
    }
}
