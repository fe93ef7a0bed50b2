//! Topology builder tests
//!
//! Drives the builder with an in-memory snapshot source; fixtures are
//! deserialized from JSON literals in the shape the cluster API returns.

use std::collections::HashMap;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::autoscaling::v2::HorizontalPodAutoscaler;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Secret, Service};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use serde_json::json;

use kubetopo::emit::render_document;
use kubetopo::kube::{SnapshotError, SnapshotSource};
use kubetopo::topo::builder::TopologyBuilder;
use kubetopo::topo::graph::TopologyGraph;

#[derive(Default)]
struct FakeSource {
    namespaces: HashMap<String, Namespace>,
    ingresses: Vec<Ingress>,
    services: HashMap<String, Service>,
    deployments: Vec<Deployment>,
    stateful_sets: Vec<StatefulSet>,
    daemon_sets: Vec<DaemonSet>,
    autoscalers: Vec<HorizontalPodAutoscaler>,
    budgets: Vec<PodDisruptionBudget>,
    config_maps: HashMap<String, ConfigMap>,
    secrets: HashMap<String, Secret>,
}

fn not_found(namespace: &str, kind: &'static str, name: &str) -> SnapshotError {
    SnapshotError::NotFound {
        namespace: namespace.to_string(),
        kind,
        name: name.to_string(),
    }
}

#[async_trait]
impl SnapshotSource for FakeSource {
    async fn get_namespace(&self, name: &str) -> Result<Namespace, SnapshotError> {
        self.namespaces
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(name, "Namespace", name))
    }

    async fn list_ingresses(&self, _namespace: &str) -> Result<Vec<Ingress>, SnapshotError> {
        Ok(self.ingresses.clone())
    }

    async fn list_deployments(&self, _namespace: &str) -> Result<Vec<Deployment>, SnapshotError> {
        Ok(self.deployments.clone())
    }

    async fn list_stateful_sets(
        &self,
        _namespace: &str,
    ) -> Result<Vec<StatefulSet>, SnapshotError> {
        Ok(self.stateful_sets.clone())
    }

    async fn list_daemon_sets(&self, _namespace: &str) -> Result<Vec<DaemonSet>, SnapshotError> {
        Ok(self.daemon_sets.clone())
    }

    async fn list_autoscalers(
        &self,
        _namespace: &str,
    ) -> Result<Vec<HorizontalPodAutoscaler>, SnapshotError> {
        Ok(self.autoscalers.clone())
    }

    async fn list_disruption_budgets(
        &self,
        _namespace: &str,
    ) -> Result<Vec<PodDisruptionBudget>, SnapshotError> {
        Ok(self.budgets.clone())
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, SnapshotError> {
        self.services
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(namespace, "Service", name))
    }

    async fn get_config_map(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ConfigMap, SnapshotError> {
        self.config_maps
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(namespace, "ConfigMap", name))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, SnapshotError> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| not_found(namespace, "Secret", name))
    }
}

fn namespace(name: &str) -> Namespace {
    serde_json::from_value(json!({
        "metadata": {
            "name": name,
            "labels": { "kubernetes.io/metadata.name": name },
        }
    }))
    .unwrap()
}

fn ingress(name: &str, host: &str, path: &str, backend_service: &str) -> Ingress {
    serde_json::from_value(json!({
        "metadata": { "name": name },
        "spec": {
            "rules": [{
                "host": host,
                "http": {
                    "paths": [{
                        "path": path,
                        "pathType": "Prefix",
                        "backend": { "service": { "name": backend_service, "port": { "number": 80 } } }
                    }]
                }
            }]
        },
        "status": { "loadBalancer": { "ingress": [{ "ip": "203.0.113.10" }] } }
    }))
    .unwrap()
}

fn service(name: &str, selector: serde_json::Value) -> Service {
    serde_json::from_value(json!({
        "metadata": { "name": name },
        "spec": {
            "selector": selector,
            "ports": [{ "port": 80, "targetPort": 8080 }]
        }
    }))
    .unwrap()
}

fn deployment(name: &str, labels: serde_json::Value, replicas: i32) -> Deployment {
    serde_json::from_value(json!({
        "metadata": { "name": name },
        "spec": {
            "replicas": replicas,
            "selector": { "matchLabels": labels.clone() },
            "template": {
                "metadata": { "labels": labels },
                "spec": { "containers": [{ "name": "app" }] }
            }
        }
    }))
    .unwrap()
}

fn deployment_with_env_from(name: &str, config_map: &str) -> Deployment {
    serde_json::from_value(json!({
        "metadata": { "name": name },
        "spec": {
            "selector": { "matchLabels": { "app": name } },
            "template": {
                "metadata": { "labels": { "app": name } },
                "spec": {
                    "containers": [{
                        "name": "app",
                        "envFrom": [{ "configMapRef": { "name": config_map } }]
                    }]
                }
            }
        }
    }))
    .unwrap()
}

fn config_map(name: &str, keys: &[&str]) -> ConfigMap {
    let data: serde_json::Map<String, serde_json::Value> = keys
        .iter()
        .map(|key| (key.to_string(), json!("value")))
        .collect();
    serde_json::from_value(json!({
        "metadata": { "name": name, "labels": { "app": "web" } },
        "data": data
    }))
    .unwrap()
}

fn web_source() -> FakeSource {
    let mut source = FakeSource::default();
    source
        .namespaces
        .insert("team-a".to_string(), namespace("team-a"));
    source
        .ingresses
        .push(ingress("web", "app.example.com", "/", "web-svc"));
    source.services.insert(
        "web-svc".to_string(),
        service("web-svc", json!({ "app": "web" })),
    );
    source
        .deployments
        .push(deployment("web-app", json!({ "app": "web" }), 2));
    source
}

async fn build(source: &FakeSource) -> TopologyGraph {
    TopologyBuilder::new(source)
        .build(&["team-a".to_string()])
        .await
}

fn has_node(graph: &TopologyGraph, path: &str) -> bool {
    graph.nodes().iter().any(|node| node.path.to_string() == path)
}

fn edge_label(graph: &TopologyGraph, from: &str, to: &str) -> Option<Option<String>> {
    graph
        .edges()
        .iter()
        .find(|edge| edge.from.to_string() == from && edge.to.to_string() == to)
        .map(|edge| edge.label.clone())
}

fn metadata_fields(graph: &TopologyGraph, path: &str) -> Option<Vec<(String, String)>> {
    graph
        .metadata()
        .iter()
        .find(|block| block.path.to_string() == path)
        .map(|block| block.fields.clone())
}

#[tokio::test]
async fn test_round_trip_scenario() {
    let graph = build(&web_source()).await;

    assert!(has_node(&graph, "namespace.'team-a'"));
    assert!(has_node(&graph, "namespace.'team-a'.ingress.'web'"));
    assert!(has_node(
        &graph,
        "namespace.'team-a'.ingress.rule.'app.example.com'"
    ));
    assert!(has_node(&graph, "namespace.'team-a'.service.'web-svc'"));
    assert!(has_node(&graph, "namespace.'team-a'.deployment.'web-app'"));

    assert_eq!(
        edge_label(
            &graph,
            "namespace.'team-a'.ingress.'web'",
            "namespace.'team-a'.ingress.rule.'app.example.com'"
        ),
        Some(None)
    );
    assert_eq!(
        edge_label(
            &graph,
            "namespace.'team-a'.ingress.rule.'app.example.com'",
            "namespace.'team-a'.service.'web-svc'"
        ),
        Some(Some("HTTP path '/'".to_string()))
    );
    assert_eq!(
        edge_label(
            &graph,
            "namespace.'team-a'.service.'web-svc'",
            "namespace.'team-a'.deployment.'web-app'"
        ),
        Some(Some("Port '8080'".to_string()))
    );

    let fields = metadata_fields(&graph, "namespace.'team-a'.deployment.'web-app'").unwrap();
    assert!(fields.contains(&("Replicas".to_string(), "2".to_string())));
}

#[tokio::test]
async fn test_deployment_node_is_declared_once_across_both_passes() {
    let graph = build(&web_source()).await;

    let declarations = graph
        .nodes()
        .iter()
        .filter(|node| node.path.to_string() == "namespace.'team-a'.deployment.'web-app'")
        .count();
    assert_eq!(declarations, 1);
}

#[tokio::test]
async fn test_negative_match_keeps_deployment_in_sweep() {
    let mut source = web_source();
    source.deployments.clear();
    source
        .deployments
        .push(deployment("web-app", json!({ "app": "other" }), 2));

    let graph = build(&source).await;

    assert_eq!(
        edge_label(
            &graph,
            "namespace.'team-a'.service.'web-svc'",
            "namespace.'team-a'.deployment.'web-app'"
        ),
        None
    );
    // The independent sweep still surfaces the deployment and its metadata.
    assert!(has_node(&graph, "namespace.'team-a'.deployment.'web-app'"));
    assert!(metadata_fields(&graph, "namespace.'team-a'.deployment.'web-app'").is_some());
}

#[tokio::test]
async fn test_missing_service_reference_skips_path_and_continues() {
    let mut source = web_source();
    source.services.clear();

    let graph = build(&source).await;

    assert!(!has_node(&graph, "namespace.'team-a'.service.'web-svc'"));
    assert!(
        graph
            .edges()
            .iter()
            .all(|edge| !edge.to.to_string().contains("service")),
        "no rule->service edge may survive an unresolved backend"
    );
    // Processing continued past the failed resolution.
    assert!(has_node(&graph, "namespace.'team-a'.deployment.'web-app'"));
}

#[tokio::test]
async fn test_shared_config_map_gets_one_node_per_owner() {
    let mut source = FakeSource::default();
    source
        .namespaces
        .insert("team-a".to_string(), namespace("team-a"));
    source
        .deployments
        .push(deployment_with_env_from("api", "shared-cfg"));
    source
        .deployments
        .push(deployment_with_env_from("worker", "shared-cfg"));
    source.config_maps.insert(
        "shared-cfg".to_string(),
        config_map("shared-cfg", &["a.properties", "b.properties"]),
    );

    let graph = build(&source).await;

    let api_path = "namespace.'team-a'.deployment.'api'.configMap.'shared-cfg'";
    let worker_path = "namespace.'team-a'.deployment.'worker'.configMap.'shared-cfg'";
    assert!(has_node(&graph, api_path));
    assert!(has_node(&graph, worker_path));

    // Same object, two reference contexts: identical metadata content under
    // two distinct canonical paths.
    let api_fields = metadata_fields(&graph, api_path).unwrap();
    let worker_fields = metadata_fields(&graph, worker_path).unwrap();
    assert_eq!(api_fields, worker_fields);
    assert!(api_fields.contains(&("Items".to_string(), "a.properties, b.properties".to_string())));
}

#[tokio::test]
async fn test_stateful_set_edges_carry_port_labels() {
    let mut source = web_source();
    let stateful_set: StatefulSet = serde_json::from_value(json!({
        "metadata": { "name": "web-store" },
        "spec": {
            "selector": { "matchLabels": { "app": "web" } },
            "serviceName": "web-svc",
            "template": {
                "metadata": { "labels": { "app": "web" } },
                "spec": { "containers": [{ "name": "store" }] }
            }
        }
    }))
    .unwrap();
    source.stateful_sets.push(stateful_set);

    let graph = build(&source).await;

    assert_eq!(
        edge_label(
            &graph,
            "namespace.'team-a'.service.'web-svc'",
            "namespace.'team-a'.statefulSet.'web-store'"
        ),
        Some(Some("Port '8080'".to_string()))
    );
}

#[tokio::test]
async fn test_deployment_children() {
    let mut source = FakeSource::default();
    source
        .namespaces
        .insert("team-a".to_string(), namespace("team-a"));
    let with_children: Deployment = serde_json::from_value(json!({
        "metadata": { "name": "web-app" },
        "spec": {
            "selector": { "matchLabels": { "app": "web" } },
            "template": {
                "metadata": { "labels": { "app": "web" } },
                "spec": {
                    "containers": [{ "name": "app" }],
                    "volumes": [
                        { "name": "config", "configMap": { "name": "web-config" } },
                        { "name": "creds", "secret": { "secretName": "web-creds" } },
                        { "name": "data", "persistentVolumeClaim": { "claimName": "web-data" } }
                    ]
                }
            }
        }
    }))
    .unwrap();
    source.deployments.push(with_children);
    source.config_maps.insert(
        "web-config".to_string(),
        config_map("web-config", &["settings.yaml"]),
    );
    source.secrets.insert(
        "web-creds".to_string(),
        serde_json::from_value(json!({
            "metadata": { "name": "web-creds" },
            "data": { "password": "aHVudGVyMg==" }
        }))
        .unwrap(),
    );
    source.autoscalers.push(
        serde_json::from_value(json!({
            "metadata": { "name": "web-hpa", "labels": { "app": "web" } },
            "spec": {
                "maxReplicas": 5,
                "scaleTargetRef": { "kind": "Deployment", "name": "web-app" }
            }
        }))
        .unwrap(),
    );
    source.budgets.push(
        serde_json::from_value(json!({
            "metadata": { "name": "web-pdb" },
            "spec": { "selector": { "matchLabels": { "app": "web" } } }
        }))
        .unwrap(),
    );

    let graph = build(&source).await;

    let deploy = "namespace.'team-a'.deployment.'web-app'";
    assert!(has_node(&graph, &format!("{deploy}.configMap.'web-config'")));
    assert!(has_node(&graph, &format!("{deploy}.secret.'web-creds'")));
    assert!(has_node(&graph, &format!("{deploy}.pvc.'web-data'")));
    assert!(has_node(&graph, &format!("{deploy}.hpa.'web-hpa'")));
    assert!(has_node(&graph, &format!("{deploy}.pdb.'web-pdb'")));

    // Volume-referenced config objects carry full metadata, and secret
    // blocks surface key names only.
    let cm_fields = metadata_fields(&graph, &format!("{deploy}.configMap.'web-config'")).unwrap();
    assert!(cm_fields.contains(&("Items".to_string(), "settings.yaml".to_string())));
    let secret_fields = metadata_fields(&graph, &format!("{deploy}.secret.'web-creds'")).unwrap();
    assert!(secret_fields.contains(&("Items".to_string(), "password".to_string())));
    assert!(
        secret_fields.iter().all(|(_, value)| !value.contains("aHVudGVyMg")),
        "secret values must never surface"
    );

    // Marker children carry no metadata block.
    assert!(metadata_fields(&graph, &format!("{deploy}.pvc.'web-data'")).is_none());
    assert!(metadata_fields(&graph, &format!("{deploy}.pdb.'web-pdb'")).is_none());
}

#[tokio::test]
async fn test_unknown_namespace_is_skipped_without_output() {
    let source = FakeSource::default();
    let graph = TopologyBuilder::new(&source)
        .build(&["ghost".to_string()])
        .await;

    assert!(graph.nodes().is_empty());
    assert!(graph.edges().is_empty());
}

#[tokio::test]
async fn test_repeated_runs_render_identical_documents() {
    let source = web_source();

    let first = render_document(&build(&source).await);
    let second = render_document(&build(&source).await);

    assert_eq!(first, second);
}
