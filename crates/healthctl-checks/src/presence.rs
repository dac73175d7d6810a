//! Component presence checks used by the Infra and PAAS suites

use k8s_openapi::api::core::v1::{Pod, Service};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use tracing::debug;

use healthctl_types::{CheckResult, PresenceTarget};

use crate::cluster::{evaluate, list_all, list_in};

/// A component is up when its namespace has pods and, unless disabled, services
pub async fn check_presence(client: &kube::Client, target: &PresenceTarget) -> CheckResult {
    let pods = list_in::<Pod>(client, &target.namespace, None)
        .await
        .map(|pods| pods.len());

    // Services are listed only when pods exist
    let services = match (&pods, target.services_namespace()) {
        (Ok(count), Some(namespace)) if *count > 0 => Some(
            list_in::<Service>(client, namespace, None)
                .await
                .map(|services| services.len()),
        ),
        _ => None,
    };

    presence_result(&target.label, pods, services)
}

/// Combine pod and service counts into a check record
fn presence_result(
    label: &str,
    pods: kube::Result<usize>,
    services: Option<kube::Result<usize>>,
) -> CheckResult {
    match pods {
        Err(e) => {
            debug!(component = label, error = %e, "pod list failed");
            return CheckResult::fail(label, "Error fetching pods");
        }
        Ok(0) => return CheckResult::fail(label, format!("No {} pods found", label)),
        Ok(_) => {}
    }

    match services {
        Some(Err(e)) => {
            debug!(component = label, error = %e, "service list failed");
            CheckResult::fail(label, "Error fetching services")
        }
        Some(Ok(0)) => CheckResult::fail(label, format!("No {} services found", label)),
        _ => CheckResult::pass(label, format!("{} is Up", label)),
    }
}

pub async fn check_crds(client: &kube::Client) -> CheckResult {
    evaluate(
        list_all(client).await,
        "FedCRD",
        "custom resource definitions",
        crds_result,
    )
}

fn crds_result(crds: &[CustomResourceDefinition]) -> CheckResult {
    if crds.is_empty() {
        CheckResult::fail("FedCRD", "No custom resource definitions found")
    } else {
        CheckResult::pass(
            "FedCRD",
            format!("FedCRD is Up ({} definitions installed)", crds.len()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error() -> kube::Error {
        kube::Error::Api(kube::error::ErrorResponse {
            status: "Failure".to_string(),
            message: "namespaces \"fed-opa\" not found".to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        })
    }

    #[test]
    fn test_component_up() {
        let result = presence_result("OPA", Ok(2), Some(Ok(1)));
        assert_eq!(result, CheckResult::pass("OPA", "OPA is Up"));
    }

    #[test]
    fn test_pods_only_component() {
        let result = presence_result("FedRbac", Ok(1), None);
        assert!(result.passed);
        assert_eq!(result.details, "FedRbac is Up");
    }

    #[test]
    fn test_missing_pods_reported_first() {
        let result = presence_result("MetalLB", Ok(0), Some(Ok(0)));
        assert_eq!(result, CheckResult::fail("MetalLB", "No MetalLB pods found"));
    }

    #[test]
    fn test_missing_services() {
        let result = presence_result("Kiali", Ok(3), Some(Ok(0)));
        assert_eq!(result, CheckResult::fail("Kiali", "No Kiali services found"));
    }

    #[test]
    fn test_list_errors() {
        assert_eq!(
            presence_result("OPA", Err(api_error()), None).details,
            "Error fetching pods"
        );
        assert_eq!(
            presence_result("OPA", Ok(1), Some(Err(api_error()))).details,
            "Error fetching services"
        );
    }

    #[test]
    fn test_crds_need_at_least_one() {
        assert!(!crds_result(&[]).passed);
        let result = crds_result(&[CustomResourceDefinition::default()]);
        assert!(result.passed);
        assert!(result.details.starts_with("FedCRD is Up"));
    }
}
