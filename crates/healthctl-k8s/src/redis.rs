//! Redis cluster diagnostics
//!
//! Status comes from the Redis operator's custom resource; `dbsize` and
//! `flushall` are run with `redis-cli --cluster call` inside a Redis pod.

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind};
use tracing::debug;

use healthctl_types::{
    PodPlacement, REDIS_CLUSTER_SLOTS, RedisClusterStatus, RedisDbSize, RedisNode, RedisSettings,
    RedisStatus,
};

use crate::client::list_pod_names;
use crate::exec::exec_shell;

/// Fetch and summarise the RedisCluster custom resource
pub async fn redis_status(client: &kube::Client, settings: &RedisSettings) -> Result<RedisStatus> {
    let gvk = GroupVersionKind::gvk(&settings.group, &settings.version, &settings.kind);
    let resource = ApiResource::from_gvk_with_plural(&gvk, &settings.plural);
    let api: Api<DynamicObject> =
        Api::namespaced_with(client.clone(), &settings.namespace, &resource);

    let object = api.get(&settings.resource_name).await.context(format!(
        "Failed to get {} '{}' in namespace '{}'",
        settings.kind, settings.resource_name, settings.namespace
    ))?;

    let status = object
        .data
        .get("status")
        .cloned()
        .context(format!("{} has no status field", settings.resource_name))?;
    let status: RedisClusterStatus =
        serde_json::from_value(status).context("Failed to decode Redis cluster status")?;

    let mut summary = summarize_status(&status);
    summary.placements = pod_placements(client, &settings.namespace, &summary.nodes).await;
    Ok(summary)
}

fn distinct_zones<'a>(nodes: impl Iterator<Item = &'a RedisNode>) -> usize {
    nodes.map(|n| n.zone.as_str()).collect::<BTreeSet<_>>().len()
}

/// Derive the dashboard summary from the operator status.
///
/// The operator reports slot ranges per node but no per-slot failure state,
/// so slots owned by primaries count as ok, unowned slots as failed and
/// `slots_pfail` stays zero.
pub fn summarize_status(status: &RedisClusterStatus) -> RedisStatus {
    let cluster = &status.cluster;
    let primaries = || cluster.nodes.iter().filter(|n| n.is_primary());
    let slots_ok = primaries()
        .map(RedisNode::slot_count)
        .sum::<u32>()
        .min(REDIS_CLUSTER_SLOTS);

    RedisStatus {
        primaries_configured: cluster.number_of_primaries,
        replicas_configured: cluster.max_replication_factor,
        pods_ready: cluster.number_of_pods == cluster.number_of_pods_ready,
        cluster_ok: cluster.status == "OK",
        slots_ok,
        slots_pfail: 0,
        slots_fail: REDIS_CLUSTER_SLOTS - slots_ok,
        known_nodes: cluster.nodes.len(),
        cluster_size: cluster.number_of_pods,
        active_zones: distinct_zones(cluster.nodes.iter()),
        primary_zones: distinct_zones(primaries()),
        nodes: cluster.nodes.clone(),
        placements: BTreeMap::new(),
    }
}

async fn pod_placements(
    client: &kube::Client,
    namespace: &str,
    nodes: &[RedisNode],
) -> BTreeMap<String, PodPlacement> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let mut placements = BTreeMap::new();

    for node in nodes {
        match pods.get(&node.pod_name).await {
            Ok(pod) => {
                placements.insert(node.pod_name.clone(), placement_of(&pod));
            }
            Err(e) => {
                debug!(pod = %node.pod_name, error = %e, "Failed to get redis pod");
            }
        }
    }

    placements
}

/// Worker node and first-container resource requests of a pod
fn placement_of(pod: &Pod) -> PodPlacement {
    let Some(spec) = pod.spec.as_ref() else {
        return PodPlacement::default();
    };

    let requests = spec
        .containers
        .first()
        .and_then(|c| c.resources.as_ref())
        .and_then(|r| r.requests.as_ref());
    let request = |name: &str| {
        requests
            .and_then(|r| r.get(name))
            .map(|q| q.0.clone())
            .unwrap_or_else(|| "0".to_string())
    };

    PodPlacement {
        worker: spec.node_name.clone().unwrap_or_default(),
        cpu: request("cpu"),
        memory: request("memory"),
    }
}

fn cluster_call_command(settings: &RedisSettings, redis_command: &str) -> String {
    format!(
        "redis-cli --cluster call --cluster-only-masters {} {}",
        settings.service_address(),
        redis_command
    )
}

/// Run `dbsize` across the primaries from every Redis pod
pub async fn db_sizes(client: &kube::Client, settings: &RedisSettings) -> Result<Vec<RedisDbSize>> {
    let pods = list_pod_names(client, &settings.namespace, None).await?;
    let command = cluster_call_command(settings, "dbsize");

    let mut sizes = Vec::with_capacity(pods.len());
    for pod in pods {
        let output = match exec_shell(
            client,
            &settings.namespace,
            &pod,
            &settings.container,
            &command,
        )
        .await
        {
            Ok(output) => output.stdout,
            Err(e) => {
                debug!(pod = %pod, error = %e, "dbsize failed");
                format!("error: {}", e)
            }
        };
        sizes.push(RedisDbSize { pod, output });
    }

    Ok(sizes)
}

/// Flush every primary. `--cluster call` fans out to all primaries, so one
/// Redis pod is enough to issue it.
pub async fn flush_all(client: &kube::Client, settings: &RedisSettings) -> Result<RedisDbSize> {
    let pods = list_pod_names(client, &settings.namespace, None).await?;
    let pod = pods
        .into_iter()
        .next()
        .context(format!("No redis pods found in {}", settings.namespace))?;

    let command = cluster_call_command(settings, "flushall");
    let output = exec_shell(
        client,
        &settings.namespace,
        &pod,
        &settings.container,
        &command,
    )
    .await?;

    if !output.success {
        anyhow::bail!(
            "flushall failed on {}: {}",
            pod,
            output
                .message
                .unwrap_or_else(|| output.stderr.trim().to_string())
        );
    }

    Ok(RedisDbSize {
        pod,
        output: output.stdout,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthctl_types::RedisClusterInfo;
    use k8s_openapi::api::core::v1::{Container, PodSpec, ResourceRequirements};
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

    fn redis_node(pod: &str, zone: &str) -> RedisNode {
        RedisNode {
            pod_name: pod.to_string(),
            zone: zone.to_string(),
            role: "Replica".to_string(),
            ..Default::default()
        }
    }

    fn primary(pod: &str, zone: &str, slots: &str) -> RedisNode {
        RedisNode {
            role: "Primary".to_string(),
            slots: vec![slots.to_string()],
            ..redis_node(pod, zone)
        }
    }

    #[test]
    fn test_summarize_status() {
        let status = RedisClusterStatus {
            cluster: RedisClusterInfo {
                number_of_pods: 6,
                number_of_pods_ready: 5,
                number_of_primaries: 3,
                max_replication_factor: 1,
                status: "OK".to_string(),
                nodes: vec![
                    redis_node("redis-0", "zone-a"),
                    redis_node("redis-1", "zone-b"),
                    redis_node("redis-2", "zone-a"),
                ],
                ..Default::default()
            },
            ..Default::default()
        };

        let summary = summarize_status(&status);
        assert_eq!(summary.primaries_configured, 3);
        assert_eq!(summary.replicas_configured, 1);
        assert!(!summary.pods_ready);
        assert!(summary.cluster_ok);
        assert_eq!(summary.known_nodes, 3);
        assert_eq!(summary.cluster_size, 6);
        assert_eq!(summary.active_zones, 2);
        assert_eq!(summary.primary_zones, 0);
        assert_eq!(summary.slots_ok, 0);
        assert_eq!(summary.slots_fail, REDIS_CLUSTER_SLOTS);
    }

    #[test]
    fn test_summarize_slots_and_primary_zones() {
        let mut status = RedisClusterStatus::default();
        status.cluster.status = "OK".to_string();
        status.cluster.nodes = vec![
            primary("redis-0", "zone-a", "0-5460"),
            primary("redis-1", "zone-b", "5461-10922"),
            primary("redis-2", "zone-a", "10923-16383"),
            redis_node("redis-3", "zone-c"),
        ];

        let summary = summarize_status(&status);
        assert_eq!(summary.slots_ok, REDIS_CLUSTER_SLOTS);
        assert_eq!(summary.slots_pfail, 0);
        assert_eq!(summary.slots_fail, 0);
        assert_eq!(summary.active_zones, 3);
        assert_eq!(summary.primary_zones, 2);

        // A primary lost with its slots
        status.cluster.nodes.remove(1);
        let summary = summarize_status(&status);
        assert_eq!(summary.slots_ok, 5461 + 5461);
        assert_eq!(summary.slots_fail, 5462);
        assert_eq!(summary.primary_zones, 1);
    }

    #[test]
    fn test_cluster_state_not_ok() {
        let mut status = RedisClusterStatus::default();
        status.cluster.status = "KO".to_string();
        let summary = summarize_status(&status);
        assert!(!summary.cluster_ok);
        assert!(summary.pods_ready);
        assert_eq!(summary.active_zones, 0);
    }

    #[test]
    fn test_placement_of() {
        let mut requests = BTreeMap::new();
        requests.insert("cpu".to_string(), Quantity("500m".to_string()));
        let pod = Pod {
            spec: Some(PodSpec {
                node_name: Some("worker-3".to_string()),
                containers: vec![Container {
                    name: "redis-node".to_string(),
                    resources: Some(ResourceRequirements {
                        requests: Some(requests),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        let placement = placement_of(&pod);
        assert_eq!(placement.worker, "worker-3");
        assert_eq!(placement.cpu, "500m");
        assert_eq!(placement.memory, "0");
        assert_eq!(placement_of(&Pod::default()), PodPlacement::default());
    }

    #[test]
    fn test_cluster_call_command() {
        let settings = RedisSettings::default();
        assert_eq!(
            cluster_call_command(&settings, "dbsize"),
            "redis-cli --cluster call --cluster-only-masters \
             redis-cluster.fed-redis-cluster.svc.cluster.local:6379 dbsize"
        );
    }
}
