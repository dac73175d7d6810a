//! Cluster-wide sanity checks
//!
//! One list call per resource kind, then a comparison over the items.

use std::fmt::Debug;

use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::core::v1::{
    Event, Node, PersistentVolume, PersistentVolumeClaim, Pod, Service,
};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::ListParams;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use tracing::debug;

use healthctl_types::CheckResult;

// ============================================================================
// Listing
// ============================================================================

/// List every object of a kind across the cluster
pub(crate) async fn list_all<K>(client: &kube::Client) -> kube::Result<Vec<K>>
where
    K: Resource + Clone + DeserializeOwned + Debug,
    <K as Resource>::DynamicType: Default,
{
    let api: Api<K> = Api::all(client.clone());
    Ok(api.list(&ListParams::default()).await?.items)
}

/// List the objects of a kind in one namespace
pub(crate) async fn list_in<K>(
    client: &kube::Client,
    namespace: &str,
    selector: Option<&str>,
) -> kube::Result<Vec<K>>
where
    K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
    <K as Resource>::DynamicType: Default,
{
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    let mut params = ListParams::default();
    if let Some(selector) = selector {
        params = params.labels(selector);
    }
    Ok(api.list(&params).await?.items)
}

/// Run `check` over a listing, or fail with "Error fetching <kind>"
pub(crate) fn evaluate<K>(
    listing: kube::Result<Vec<K>>,
    label: &str,
    kind: &str,
    check: impl FnOnce(&[K]) -> CheckResult,
) -> CheckResult {
    match listing {
        Ok(items) => check(&items),
        Err(e) => {
            debug!(kind, error = %e, "list failed");
            CheckResult::fail(label, format!("Error fetching {}", kind))
        }
    }
}

// ============================================================================
// Async checks
// ============================================================================

pub async fn nodes(client: &kube::Client) -> CheckResult {
    evaluate(list_all(client).await, "Nodes", "nodes", check_nodes)
}

pub async fn pods(client: &kube::Client) -> CheckResult {
    evaluate(list_all(client).await, "Pods", "pods", check_pods)
}

pub async fn persistent_volumes(client: &kube::Client) -> CheckResult {
    evaluate(
        list_all(client).await,
        "Persistent Volumes",
        "persistent volumes",
        check_persistent_volumes,
    )
}

pub async fn persistent_volume_claims(client: &kube::Client) -> CheckResult {
    evaluate(
        list_all(client).await,
        "Persistent Volume Claims",
        "persistent volume claims",
        check_persistent_volume_claims,
    )
}

pub async fn services(client: &kube::Client) -> CheckResult {
    evaluate(list_all(client).await, "Services", "services", check_services)
}

pub async fn deployments(client: &kube::Client) -> CheckResult {
    evaluate(
        list_all(client).await,
        "Deployments",
        "deployments",
        check_deployments,
    )
}

pub async fn replica_sets(client: &kube::Client) -> CheckResult {
    evaluate(
        list_all(client).await,
        "Replica Sets",
        "replica sets",
        check_replica_sets,
    )
}

pub async fn events(client: &kube::Client) -> CheckResult {
    evaluate(list_all(client).await, "Events", "events", check_events)
}

pub async fn ingresses(client: &kube::Client) -> CheckResult {
    evaluate(
        list_all(client).await,
        "Ingresses",
        "ingresses",
        check_ingresses,
    )
}

pub async fn daemon_sets(client: &kube::Client) -> CheckResult {
    evaluate(
        list_all(client).await,
        "Daemon Sets",
        "daemon sets",
        check_daemon_sets,
    )
}

pub async fn stateful_sets(client: &kube::Client) -> CheckResult {
    evaluate(
        list_all(client).await,
        "Stateful Sets",
        "stateful sets",
        check_stateful_sets,
    )
}

// ============================================================================
// Evaluators
// ============================================================================

/// `spec.replicas` defaults to 1 when unset, ready counts to 0
fn replicas_converged(desired: Option<i32>, ready: Option<i32>) -> bool {
    desired.unwrap_or(1) == ready.unwrap_or(0)
}

fn is_node_ready(node: &Node) -> bool {
    node.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .is_some_and(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
}

pub fn check_nodes(nodes: &[Node]) -> CheckResult {
    const LABEL: &str = "Nodes";
    if nodes.is_empty() {
        return CheckResult::fail(LABEL, "No nodes are available.");
    }

    let not_ready: Vec<&str> = nodes
        .iter()
        .filter(|n| !is_node_ready(n))
        .map(|n| n.metadata.name.as_deref().unwrap_or_default())
        .collect();

    if not_ready.is_empty() {
        CheckResult::pass(
            LABEL,
            format!("Number of nodes : {}. All nodes are ready.", nodes.len()),
        )
    } else {
        CheckResult::fail(
            LABEL,
            format!("Nodes not ready: {}", not_ready.join(", ")),
        )
    }
}

pub fn check_pods(pods: &[Pod]) -> CheckResult {
    let total = pods.len();
    let healthy = pods
        .iter()
        .filter(|p| {
            matches!(
                p.status.as_ref().and_then(|s| s.phase.as_deref()),
                Some("Running" | "Succeeded")
            )
        })
        .count();

    let message = if total == 0 {
        "No pods are available.".to_string()
    } else if healthy == total {
        "All pods are healthy.".to_string()
    } else {
        format!("{} out of {} pods are healthy.", healthy, total)
    };

    CheckResult::new(
        "Pods",
        format!("Total: {}, Healthy: {}. Status: {}", total, healthy, message),
        healthy == total,
    )
}

pub fn check_persistent_volumes(volumes: &[PersistentVolume]) -> CheckResult {
    const LABEL: &str = "Persistent Volumes";
    if volumes.is_empty() {
        return CheckResult::fail(LABEL, "No persistent volumes are available.");
    }

    let all_bound = volumes
        .iter()
        .all(|pv| pv.status.as_ref().and_then(|s| s.phase.as_deref()) == Some("Bound"));

    if all_bound {
        CheckResult::pass(LABEL, "All persistent volumes are bound.")
    } else {
        CheckResult::fail(LABEL, "Some persistent volumes are not bound.")
    }
}

pub fn check_persistent_volume_claims(claims: &[PersistentVolumeClaim]) -> CheckResult {
    const LABEL: &str = "Persistent Volume Claims";
    if claims.is_empty() {
        return CheckResult::fail(LABEL, "No persistent volume claims are available.");
    }

    let unbound = claims
        .iter()
        .filter(|pvc| pvc.status.as_ref().and_then(|s| s.phase.as_deref()) != Some("Bound"))
        .count();

    if unbound == 0 {
        CheckResult::pass(
            LABEL,
            format!(
                "Count of PVC: {}. All persistent volume claims are bound.",
                claims.len()
            ),
        )
    } else {
        CheckResult::fail(
            LABEL,
            format!(
                "Count of PVC: {}. {} persistent volume claims are not bound.",
                claims.len(),
                unbound
            ),
        )
    }
}

pub fn check_services(services: &[Service]) -> CheckResult {
    if services.is_empty() {
        CheckResult::fail("Services", "No services are available.")
    } else {
        CheckResult::pass(
            "Services",
            format!("Count of services: {}", services.len()),
        )
    }
}

pub fn check_deployments(deployments: &[Deployment]) -> CheckResult {
    const LABEL: &str = "Deployments";
    if deployments.is_empty() {
        return CheckResult::fail(LABEL, "No deployments are available.");
    }

    let healthy = deployments.iter().all(|d| {
        replicas_converged(
            d.spec.as_ref().and_then(|s| s.replicas),
            d.status.as_ref().and_then(|s| s.ready_replicas),
        )
    });

    if healthy {
        CheckResult::pass(LABEL, "All deployments are healthy.")
    } else {
        CheckResult::fail(LABEL, "Some deployments are not healthy.")
    }
}

pub fn check_replica_sets(replica_sets: &[ReplicaSet]) -> CheckResult {
    const LABEL: &str = "Replica Sets";
    if replica_sets.is_empty() {
        return CheckResult::fail(LABEL, "No replica sets are available.");
    }

    let healthy = replica_sets.iter().all(|rs| {
        replicas_converged(
            rs.spec.as_ref().and_then(|s| s.replicas),
            rs.status.as_ref().and_then(|s| s.ready_replicas),
        )
    });

    if healthy {
        CheckResult::pass(LABEL, "All replica sets are healthy.")
    } else {
        CheckResult::fail(LABEL, "Some replica sets are not healthy.")
    }
}

pub fn check_events(events: &[Event]) -> CheckResult {
    const LABEL: &str = "Events";
    if events.is_empty() {
        return CheckResult::pass(LABEL, "No errors found in events.");
    }

    let count_of = |kind: &str| {
        events
            .iter()
            .filter(|e| e.type_.as_deref() == Some(kind))
            .count()
    };
    let warnings = count_of("Warning");
    let errors = count_of("Error");

    if warnings + errors > 0 {
        CheckResult::fail(
            LABEL,
            format!(
                "Count of Events: {}. {} warning events and {} error events found.",
                events.len(),
                warnings,
                errors
            ),
        )
    } else {
        CheckResult::pass(
            LABEL,
            format!(
                "Count of Events: {}. No critical issues found in events.",
                events.len()
            ),
        )
    }
}

pub fn check_ingresses(ingresses: &[Ingress]) -> CheckResult {
    if ingresses.is_empty() {
        CheckResult::fail("Ingresses", "No ingresses are available.")
    } else {
        CheckResult::pass("Ingresses", format!("Total: {}", ingresses.len()))
    }
}

pub fn check_daemon_sets(daemon_sets: &[DaemonSet]) -> CheckResult {
    const LABEL: &str = "Daemon Sets";
    if daemon_sets.is_empty() {
        return CheckResult::fail(LABEL, "No daemon sets are available.");
    }

    let healthy = daemon_sets.iter().all(|ds| {
        ds.status.as_ref().is_none_or(|s| {
            s.desired_number_scheduled == s.current_number_scheduled
        })
    });

    if healthy {
        CheckResult::pass(LABEL, "All daemon sets are healthy.")
    } else {
        CheckResult::fail(LABEL, "Some daemon sets are not healthy.")
    }
}

pub fn check_stateful_sets(stateful_sets: &[StatefulSet]) -> CheckResult {
    const LABEL: &str = "Stateful Sets";
    if stateful_sets.is_empty() {
        return CheckResult::fail(LABEL, "No stateful sets are available.");
    }

    let healthy = stateful_sets.iter().all(|ss| {
        replicas_converged(
            ss.spec.as_ref().and_then(|s| s.replicas),
            ss.status.as_ref().and_then(|s| s.ready_replicas),
        )
    });

    if healthy {
        CheckResult::pass(LABEL, "All stateful sets are healthy.")
    } else {
        CheckResult::fail(LABEL, "Some stateful sets are not healthy.")
    }
}
