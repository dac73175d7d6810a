//! Storage class availability

use k8s_openapi::api::storage::v1::StorageClass;

use healthctl_types::CheckResult;

use crate::cluster::{evaluate, list_all};

const DEFAULT_CLASS_ANNOTATION: &str = "storageclass.kubernetes.io/is-default-class";

pub async fn storage_classes(client: &kube::Client) -> CheckResult {
    evaluate(
        list_all(client).await,
        "Storage Classes",
        "storage classes",
        check_storage_classes,
    )
}

fn is_default_class(class: &StorageClass) -> bool {
    class
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(DEFAULT_CLASS_ANNOTATION))
        .is_some_and(|v| v == "true")
}

pub fn check_storage_classes(classes: &[StorageClass]) -> CheckResult {
    const LABEL: &str = "Storage Classes";
    if classes.is_empty() {
        return CheckResult::fail(LABEL, "No storage classes are available.");
    }

    let default = classes
        .iter()
        .find(|c| is_default_class(c))
        .and_then(|c| c.metadata.name.as_deref());

    let details = match default {
        Some(name) => format!(
            "Count of storage classes: {}. Default: {}",
            classes.len(),
            name
        ),
        None => format!(
            "Count of storage classes: {}. No default storage class.",
            classes.len()
        ),
    };
    CheckResult::pass(LABEL, details)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, default: Option<&str>) -> StorageClass {
        let mut class = StorageClass {
            provisioner: "kubernetes.io/no-provisioner".to_string(),
            ..Default::default()
        };
        class.metadata.name = Some(name.to_string());
        if let Some(value) = default {
            class.metadata.annotations = Some(
                [(DEFAULT_CLASS_ANNOTATION.to_string(), value.to_string())].into(),
            );
        }
        class
    }

    #[test]
    fn test_default_class_reported() {
        let result = check_storage_classes(&[
            class("local", Some("false")),
            class("ceph-rbd", Some("true")),
        ]);
        assert!(result.passed);
        assert_eq!(result.details, "Count of storage classes: 2. Default: ceph-rbd");
    }

    #[test]
    fn test_no_default_class() {
        let result = check_storage_classes(&[class("local", None)]);
        assert!(result.passed);
        assert!(result.details.ends_with("No default storage class."));
    }

    #[test]
    fn test_no_classes_fails() {
        assert!(!check_storage_classes(&[]).passed);
    }
}
