//! Topology graph construction
//!
//! Walks one namespace at a time: the ingress subtree first (ingress → rule →
//! service → matched workloads), then the ingress-independent deployment
//! sweep (deployment → config objects, autoscalers, disruption budgets,
//! volume claims). Deployments reachable through a service are discovered by
//! both passes; node declarations are idempotent by canonical path, so the
//! second discovery is a no-op.
//!
//! Listing failures are handled per the blast radius documented on
//! [`SnapshotError`]: top-level listings abort the namespace, inner listings
//! skip their resource kind, named gets skip the single node or edge. Every
//! skip is logged with namespace, kind, and name.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentStrategy};
use k8s_openapi::api::core::v1::{PodTemplateSpec, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::kube::snapshot::{SnapshotError, SnapshotSource};
use crate::topo::graph::{Edge, LayoutHint, MetadataBlock, Node, NodeClass, TopologyGraph};
use crate::topo::path::{KindTag, ResourcePath};
use crate::topo::selector::selector_matches;

/// Builds the topology graph for a set of namespaces from one snapshot view
/// of the cluster.
pub struct TopologyBuilder<'a, S: SnapshotSource> {
    source: &'a S,
    graph: TopologyGraph,
}

impl<'a, S: SnapshotSource> TopologyBuilder<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self {
            source,
            graph: TopologyGraph::new(),
        }
    }

    /// Build every configured namespace. A namespace whose top-level
    /// listings fail is logged and dropped; the remaining namespaces still
    /// contribute to the graph.
    pub async fn build(mut self, namespaces: &[String]) -> TopologyGraph {
        for namespace in namespaces {
            if let Err(e) = self.build_namespace(namespace).await {
                tracing::warn!("skipping namespace {}: {}", namespace, e);
            }
        }
        self.graph
    }

    async fn build_namespace(&mut self, namespace: &str) -> Result<(), SnapshotError> {
        let ns_path = ResourcePath::namespace(namespace);
        let ns = self.source.get_namespace(namespace).await?;

        self.graph.add_hint(LayoutHint {
            path: ns_path.clone(),
            grid_columns: 1,
        });
        self.graph.add_hint(LayoutHint {
            path: ns_path.group(KindTag::Deployment),
            grid_columns: 3,
        });

        self.graph.declare(Node {
            path: ns_path.clone(),
            class: Some(NodeClass::Namespace),
            label: Some(format!("Namespace {namespace}")),
        });
        self.graph.attach_metadata(MetadataBlock {
            path: ns_path.clone(),
            title: format!("Namespace {namespace}"),
            fields: vec![
                (
                    "Labels".to_string(),
                    format_label_map(ns.metadata.labels.as_ref()),
                ),
                (
                    "Annotations".to_string(),
                    format_label_map(ns.metadata.annotations.as_ref()),
                ),
            ],
        });

        let services = self.walk_ingresses(namespace, &ns_path).await?;
        self.join_services(namespace, &ns_path, &services).await;
        self.sweep_deployments(namespace, &ns_path).await?;

        Ok(())
    }

    /// Ingress subtree: ingress nodes, rule nodes, and rule→service edges.
    ///
    /// Returns the services resolved from rule backends in first-seen order,
    /// deduplicated by name: one service referenced by many rules is
    /// cross-joined against workloads once.
    async fn walk_ingresses(
        &mut self,
        namespace: &str,
        ns_path: &ResourcePath,
    ) -> Result<Vec<Service>, SnapshotError> {
        let mut resolved: Vec<Service> = Vec::new();

        for ingress in self.source.list_ingresses(namespace).await? {
            let Some(ingress_name) = ingress.metadata.name.clone() else {
                continue;
            };
            let ingress_path = ns_path.child(KindTag::Ingress, &ingress_name);
            self.graph.declare(Node {
                path: ingress_path.clone(),
                class: Some(NodeClass::Ingress),
                label: Some(format!("Ingress {ingress_name}")),
            });
            self.graph.attach_metadata(MetadataBlock {
                path: ingress_path.clone(),
                title: format!("Ingress {ingress_name}"),
                fields: vec![("Endpoints".to_string(), ingress_endpoints(&ingress))],
            });

            let rules = ingress
                .spec
                .as_ref()
                .and_then(|spec| spec.rules.clone())
                .unwrap_or_default();
            for rule in &rules {
                // A rule without a host still carries resolvable paths; it
                // is addressed by the empty host name.
                let host = rule.host.clone().unwrap_or_default();
                let rule_path = ns_path.group(KindTag::Ingress).child(KindTag::Rule, &host);
                self.graph.declare(Node {
                    path: rule_path.clone(),
                    class: None,
                    label: None,
                });
                self.graph.add_edge(Edge {
                    from: ingress_path.clone(),
                    to: rule_path.clone(),
                    label: None,
                });

                let paths = rule
                    .http
                    .as_ref()
                    .map(|http| http.paths.as_slice())
                    .unwrap_or_default();
                for http_path in paths {
                    let Some(backend) = http_path.backend.service.as_ref() else {
                        continue;
                    };
                    let service = match self.source.get_service(namespace, &backend.name).await {
                        Ok(service) => service,
                        Err(e) => {
                            tracing::warn!(
                                "cannot resolve backend of ingress {} rule {}: {}",
                                ingress_name,
                                host,
                                e
                            );
                            continue;
                        }
                    };

                    let service_name = service
                        .metadata
                        .name
                        .clone()
                        .unwrap_or_else(|| backend.name.clone());
                    let service_path = ns_path.child(KindTag::Service, &service_name);
                    self.graph.declare(Node {
                        path: service_path.clone(),
                        class: Some(NodeClass::Service),
                        label: Some(format!("Service {service_name}")),
                    });
                    self.graph.add_edge(Edge {
                        from: rule_path.clone(),
                        to: service_path,
                        label: Some(format!(
                            "HTTP path '{}'",
                            http_path.path.as_deref().unwrap_or_default()
                        )),
                    });

                    if !resolved
                        .iter()
                        .any(|s| s.metadata.name == service.metadata.name)
                    {
                        resolved.push(service);
                    }
                }
            }
        }

        Ok(resolved)
    }

    /// Cross-join every resolved service against every workload variant
    /// using the selector matcher: the service selector is the query, the
    /// workload's pod-template labels are the candidate. Matched edges carry
    /// the service's target ports for all three variants.
    async fn join_services(
        &mut self,
        namespace: &str,
        ns_path: &ResourcePath,
        services: &[Service],
    ) {
        if services.is_empty() {
            return;
        }

        let deployments = list_or_skip(self.source.list_deployments(namespace).await);
        let stateful_sets = list_or_skip(self.source.list_stateful_sets(namespace).await);
        let daemon_sets = list_or_skip(self.source.list_daemon_sets(namespace).await);

        for service in services {
            let Some(service_name) = service.metadata.name.as_deref() else {
                continue;
            };
            let selector = service
                .spec
                .as_ref()
                .and_then(|spec| spec.selector.clone())
                .unwrap_or_default();
            let service_path = ns_path.child(KindTag::Service, service_name);
            let ports = service_target_ports(service);

            for deployment in &deployments {
                let Some(name) = deployment.metadata.name.as_deref() else {
                    continue;
                };
                let labels =
                    pod_template_labels(deployment.spec.as_ref().map(|spec| &spec.template));
                if selector_matches(&selector, &labels) {
                    self.link_workload(
                        &service_path,
                        ns_path.child(KindTag::Deployment, name),
                        NodeClass::Deployment,
                        &ports,
                    );
                }
            }

            for stateful_set in &stateful_sets {
                let Some(name) = stateful_set.metadata.name.as_deref() else {
                    continue;
                };
                let labels =
                    pod_template_labels(stateful_set.spec.as_ref().map(|spec| &spec.template));
                if selector_matches(&selector, &labels) {
                    self.link_workload(
                        &service_path,
                        ns_path.child(KindTag::StatefulSet, name),
                        NodeClass::StatefulSet,
                        &ports,
                    );
                }
            }

            for daemon_set in &daemon_sets {
                let Some(name) = daemon_set.metadata.name.as_deref() else {
                    continue;
                };
                let labels =
                    pod_template_labels(daemon_set.spec.as_ref().map(|spec| &spec.template));
                if selector_matches(&selector, &labels) {
                    self.link_workload(
                        &service_path,
                        ns_path.child(KindTag::DaemonSet, name),
                        NodeClass::DaemonSet,
                        &ports,
                    );
                }
            }
        }
    }

    fn link_workload(
        &mut self,
        service_path: &ResourcePath,
        workload_path: ResourcePath,
        class: NodeClass,
        ports: &str,
    ) {
        self.graph.declare(Node {
            path: workload_path.clone(),
            class: Some(class),
            label: None,
        });
        self.graph.add_edge(Edge {
            from: service_path.clone(),
            to: workload_path,
            label: Some(format!("Port '{ports}'")),
        });
    }

    /// Ingress-independent deployment sweep: every deployment in the
    /// namespace with its metadata block and its child resources.
    async fn sweep_deployments(
        &mut self,
        namespace: &str,
        ns_path: &ResourcePath,
    ) -> Result<(), SnapshotError> {
        let deployments = self.source.list_deployments(namespace).await?;
        let autoscalers = list_or_skip(self.source.list_autoscalers(namespace).await);
        let budgets = list_or_skip(self.source.list_disruption_budgets(namespace).await);

        for deployment in &deployments {
            let Some(name) = deployment.metadata.name.as_deref() else {
                continue;
            };
            let deploy_path = ns_path.child(KindTag::Deployment, name);
            self.graph.declare(Node {
                path: deploy_path.clone(),
                class: Some(NodeClass::Deployment),
                label: None,
            });
            self.graph
                .attach_metadata(deployment_metadata(&deploy_path, name, deployment));
            self.graph.add_hint(LayoutHint {
                path: deploy_path.clone(),
                grid_columns: 1,
            });

            let pod_spec = deployment
                .spec
                .as_ref()
                .and_then(|spec| spec.template.spec.as_ref());
            let volumes = pod_spec.and_then(|pod| pod.volumes.as_deref()).unwrap_or_default();

            for volume in volumes {
                if let Some(cm_name) = volume.config_map.as_ref().map(|cm| cm.name.as_str())
                {
                    self.declare_config_map(namespace, &deploy_path, cm_name).await;
                }
                if let Some(secret_name) = volume
                    .secret
                    .as_ref()
                    .and_then(|secret| secret.secret_name.as_deref())
                {
                    self.declare_secret(namespace, &deploy_path, secret_name).await;
                }
            }

            let containers = pod_spec
                .map(|pod| pod.containers.as_slice())
                .unwrap_or_default();
            for container in containers {
                for env_from in container.env_from.as_deref().unwrap_or_default() {
                    if let Some(cm_name) = env_from
                        .config_map_ref
                        .as_ref()
                        .map(|reference| reference.name.as_str())
                    {
                        self.declare_config_map(namespace, &deploy_path, cm_name).await;
                    }
                    if let Some(secret_name) = env_from
                        .secret_ref
                        .as_ref()
                        .map(|reference| reference.name.as_str())
                    {
                        self.declare_secret(namespace, &deploy_path, secret_name).await;
                    }
                }
            }

            for hpa in &autoscalers {
                let Some(hpa_name) = hpa.metadata.name.as_deref() else {
                    continue;
                };
                let targets_deployment = hpa
                    .spec
                    .as_ref()
                    .map(|spec| spec.scale_target_ref.name.as_str())
                    == Some(name);
                if !targets_deployment {
                    continue;
                }
                let hpa_path = deploy_path.child(KindTag::Hpa, hpa_name);
                self.graph.declare(Node {
                    path: hpa_path.clone(),
                    class: Some(NodeClass::Autoscaler),
                    label: Some(format!("HPA {hpa_name}")),
                });
                self.graph.attach_metadata(MetadataBlock {
                    path: hpa_path,
                    title: format!("HPA {hpa_name}"),
                    fields: vec![
                        (
                            "Labels".to_string(),
                            format_label_map(hpa.metadata.labels.as_ref()),
                        ),
                        (
                            "Annotations".to_string(),
                            format_label_map(hpa.metadata.annotations.as_ref()),
                        ),
                    ],
                });
            }

            let labels = pod_template_labels(deployment.spec.as_ref().map(|spec| &spec.template));
            for budget in &budgets {
                let Some(budget_name) = budget.metadata.name.as_deref() else {
                    continue;
                };
                let selector = budget
                    .spec
                    .as_ref()
                    .and_then(|spec| spec.selector.as_ref())
                    .and_then(|selector| selector.match_labels.clone())
                    .unwrap_or_default();
                if selector_matches(&selector, &labels) {
                    self.graph.declare(Node {
                        path: deploy_path.child(KindTag::Pdb, budget_name),
                        class: Some(NodeClass::DisruptionBudget),
                        label: None,
                    });
                }
            }

            for volume in volumes {
                if let Some(claim) = volume.persistent_volume_claim.as_ref() {
                    self.graph.declare(Node {
                        path: deploy_path.child(KindTag::Pvc, &claim.claim_name),
                        class: Some(NodeClass::VolumeClaim),
                        label: None,
                    });
                }
            }
        }

        Ok(())
    }

    /// Declare a ConfigMap child of a workload and attach its metadata from
    /// the snapshot source. Resolution failure leaves the bare node in place
    /// and is reported.
    async fn declare_config_map(&mut self, namespace: &str, parent: &ResourcePath, name: &str) {
        let path = parent.child(KindTag::ConfigMap, name);
        self.graph.declare(Node {
            path: path.clone(),
            class: Some(NodeClass::ConfigMap),
            label: None,
        });

        match self.source.get_config_map(namespace, name).await {
            Ok(config_map) => {
                let items = config_map
                    .data
                    .as_ref()
                    .map(|data| data.keys().cloned().collect::<Vec<_>>().join(", "))
                    .unwrap_or_default();
                self.graph.attach_metadata(MetadataBlock {
                    path,
                    title: format!("ConfigMap {name}"),
                    fields: vec![
                        ("Items".to_string(), items),
                        (
                            "Labels".to_string(),
                            format_label_map(config_map.metadata.labels.as_ref()),
                        ),
                        (
                            "Annotations".to_string(),
                            format_label_map(config_map.metadata.annotations.as_ref()),
                        ),
                    ],
                });
            }
            Err(e) => tracing::warn!("cannot resolve ConfigMap metadata: {}", e),
        }
    }

    /// Declare a Secret child of a workload. Only data key names are
    /// surfaced, never values.
    async fn declare_secret(&mut self, namespace: &str, parent: &ResourcePath, name: &str) {
        let path = parent.child(KindTag::Secret, name);
        self.graph.declare(Node {
            path: path.clone(),
            class: Some(NodeClass::Secret),
            label: Some(format!("Secret {name}")),
        });

        match self.source.get_secret(namespace, name).await {
            Ok(secret) => {
                let items = secret
                    .data
                    .as_ref()
                    .map(|data| data.keys().cloned().collect::<Vec<_>>().join(", "))
                    .unwrap_or_default();
                self.graph.attach_metadata(MetadataBlock {
                    path,
                    title: format!("Secret {name}"),
                    fields: vec![
                        ("Items".to_string(), items),
                        (
                            "Labels".to_string(),
                            format_label_map(secret.metadata.labels.as_ref()),
                        ),
                        (
                            "Annotations".to_string(),
                            format_label_map(secret.metadata.annotations.as_ref()),
                        ),
                    ],
                });
            }
            Err(e) => tracing::warn!("cannot resolve Secret metadata: {}", e),
        }
    }
}

/// Unwrap a listing, logging and yielding an empty listing on failure so the
/// caller can proceed without that resource kind.
fn list_or_skip<T>(result: Result<Vec<T>, SnapshotError>) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("{}; proceeding without this resource kind", e);
            Vec::new()
        }
    }
}

fn pod_template_labels(template: Option<&PodTemplateSpec>) -> BTreeMap<String, String> {
    template
        .and_then(|template| template.metadata.as_ref())
        .and_then(|metadata| metadata.labels.clone())
        .unwrap_or_default()
}

fn format_label_map(map: Option<&BTreeMap<String, String>>) -> String {
    map.map(|map| {
        map.iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    })
    .unwrap_or_default()
}

fn ingress_endpoints(ingress: &Ingress) -> String {
    ingress
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| entry.ip.as_deref().or(entry.hostname.as_deref()))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

/// Target ports exposed by a service, joined for use as an edge label. Falls
/// back to the service port when no target port is named.
fn service_target_ports(service: &Service) -> String {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_ref())
        .map(|ports| {
            ports
                .iter()
                .map(|port| match &port.target_port {
                    Some(target) => int_or_string(target),
                    None => port.port.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default()
}

fn int_or_string(value: &IntOrString) -> String {
    match value {
        IntOrString::Int(value) => value.to_string(),
        IntOrString::String(value) => value.clone(),
    }
}

fn deployment_metadata(path: &ResourcePath, name: &str, deployment: &Deployment) -> MetadataBlock {
    let spec = deployment.spec.as_ref();
    let replicas = spec
        .and_then(|spec| spec.replicas)
        .map(|replicas| replicas.to_string())
        .unwrap_or_default();
    let strategy = spec
        .and_then(|spec| spec.strategy.as_ref())
        .map(format_strategy)
        .unwrap_or_default();
    let min_ready = spec.and_then(|spec| spec.min_ready_seconds).unwrap_or(0);
    let progress_deadline = spec
        .and_then(|spec| spec.progress_deadline_seconds)
        .map(|seconds| seconds.to_string())
        .unwrap_or_default();

    MetadataBlock {
        path: path.clone(),
        title: format!("Deployment {name}"),
        fields: vec![
            ("Replicas".to_string(), replicas),
            ("Strategy".to_string(), strategy),
            ("MinReadySeconds".to_string(), min_ready.to_string()),
            ("ProgressDeadlineSeconds".to_string(), progress_deadline),
        ],
    }
}

fn format_strategy(strategy: &DeploymentStrategy) -> String {
    let type_ = strategy.type_.as_deref().unwrap_or("RollingUpdate");
    match strategy.rolling_update.as_ref() {
        Some(rolling) => {
            let max_surge = rolling
                .max_surge
                .as_ref()
                .map(int_or_string)
                .unwrap_or_else(|| "-".to_string());
            let max_unavailable = rolling
                .max_unavailable
                .as_ref()
                .map(int_or_string)
                .unwrap_or_else(|| "-".to_string());
            format!("{type_} (maxSurge={max_surge}, maxUnavailable={max_unavailable})")
        }
        None => type_.to_string(),
    }
}
