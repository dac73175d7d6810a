//! Readiness of network-function workloads, grouped by their `app` label

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Pod;
use tracing::debug;

use healthctl_types::CheckResult;

use crate::cluster::list_in;

const APP_LABEL: &str = "app";
const UNLABELLED: &str = "(no app label)";

pub async fn check_workloads(client: &kube::Client, namespace: &str) -> Vec<CheckResult> {
    match list_in::<Pod>(client, namespace, None).await {
        Ok(pods) if pods.is_empty() => vec![CheckResult::fail(
            "Pods",
            format!("No pods found in {}", namespace),
        )],
        Ok(pods) => group_by_app(&pods),
        Err(e) => {
            debug!(namespace, error = %e, "pod list failed");
            vec![CheckResult::fail(
                "Pods",
                format!("Error fetching pods in {}", namespace),
            )]
        }
    }
}

/// Pods without container statuses have not started and count as not ready
fn is_pod_ready(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .is_some_and(|statuses| !statuses.is_empty() && statuses.iter().all(|c| c.ready))
}

/// One record per app, sorted by app name
pub fn group_by_app(pods: &[Pod]) -> Vec<CheckResult> {
    let mut groups: BTreeMap<&str, (bool, Vec<&str>)> = BTreeMap::new();

    for pod in pods {
        let app = pod
            .metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(APP_LABEL))
            .map(String::as_str)
            .unwrap_or(UNLABELLED);

        let entry = groups.entry(app).or_insert((true, Vec::new()));
        entry.0 &= is_pod_ready(pod);
        entry
            .1
            .push(pod.metadata.name.as_deref().unwrap_or_default());
    }

    groups
        .into_iter()
        .map(|(app, (ready, names))| {
            CheckResult::new(app, format!("Deployment: {}", names.join(", ")), ready)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{ContainerStatus, PodStatus};

    fn pod(name: &str, app: Option<&str>, ready: &[bool]) -> Pod {
        let mut pod = Pod::default();
        pod.metadata.name = Some(name.to_string());
        if let Some(app) = app {
            pod.metadata.labels = Some([(APP_LABEL.to_string(), app.to_string())].into());
        }
        pod.status = Some(PodStatus {
            container_statuses: Some(
                ready
                    .iter()
                    .map(|r| ContainerStatus {
                        ready: *r,
                        ..Default::default()
                    })
                    .collect(),
            ),
            ..Default::default()
        });
        pod
    }

    #[test]
    fn test_groups_sorted_by_app() {
        let pods = vec![
            pod("smf-sm-1", Some("smf-sm"), &[true, true]),
            pod("amf-0", Some("amf"), &[true]),
            pod("smf-sm-0", Some("smf-sm"), &[true]),
        ];

        let results = group_by_app(&pods);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0], CheckResult::pass("amf", "Deployment: amf-0"));
        assert_eq!(
            results[1],
            CheckResult::pass("smf-sm", "Deployment: smf-sm-1, smf-sm-0")
        );
    }

    #[test]
    fn test_one_unready_container_fails_the_group() {
        let pods = vec![
            pod("upf-0", Some("upf"), &[true, true]),
            pod("upf-1", Some("upf"), &[true, false]),
        ];

        let results = group_by_app(&pods);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
    }

    #[test]
    fn test_unlabelled_and_unstarted_pods() {
        let pods = vec![pod("debug", None, &[true]), pod("pending", Some("x"), &[])];
        let results = group_by_app(&pods);

        let unlabelled = results.iter().find(|r| r.label == UNLABELLED).unwrap();
        assert!(unlabelled.passed);
        let pending = results.iter().find(|r| r.label == "x").unwrap();
        assert!(!pending.passed);
    }
}
