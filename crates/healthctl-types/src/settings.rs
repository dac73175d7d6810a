//! Cluster layout settings
//!
//! Namespaces, pod names and ports of the components healthctl inspects.
//! Every field has a default matching the standard deployment, so an empty
//! or missing settings file is valid.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Top-level settings, deserialized from the TOML settings file
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub alertmanager: AlertManagerSettings,
    pub redis: RedisSettings,
    pub smf: SmfSettings,
    pub upf: UpfSettings,
    pub kargo: KargoSettings,
    pub debug: DebugSettings,
    pub infra: Vec<PresenceTarget>,
    pub paas: Vec<PresenceTarget>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            alertmanager: AlertManagerSettings::default(),
            redis: RedisSettings::default(),
            smf: SmfSettings::default(),
            upf: UpfSettings::default(),
            kargo: KargoSettings::default(),
            debug: DebugSettings::default(),
            infra: default_infra_targets(),
            paas: default_paas_targets(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AlertManagerSettings {
    pub namespace: String,
    pub pod: String,
    pub container: String,
    /// Alertmanager URL as seen from inside the pod
    pub url: String,
}

impl Default for AlertManagerSettings {
    fn default() -> Self {
        Self {
            namespace: "fed-prometheus".to_string(),
            pod: "alertmanager-prometheus-alerts-0".to_string(),
            container: "alertmanager".to_string(),
            url: "http://localhost:9093".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    pub namespace: String,
    pub container: String,
    /// Service fronting the cluster, used as the `redis-cli --cluster` entry point
    pub service: String,
    pub port: u16,
    /// Name of the RedisCluster custom resource
    pub resource_name: String,
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
}

impl RedisSettings {
    /// In-cluster address of the Redis service
    pub fn service_address(&self) -> String {
        format!(
            "{}.{}.svc.cluster.local:{}",
            self.service, self.namespace, self.port
        )
    }
}

impl Default for RedisSettings {
    fn default() -> Self {
        Self {
            namespace: "fed-redis-cluster".to_string(),
            container: "redis-node".to_string(),
            service: "redis-cluster".to_string(),
            port: 6379,
            resource_name: "node-for-redis".to_string(),
            group: "db.ibm.com".to_string(),
            version: "v1alpha1".to_string(),
            kind: "RedisCluster".to_string(),
            plural: "redisclusters".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SmfSettings {
    pub namespace: String,
    /// Label selector of the monitor pod
    pub monitor_selector: String,
    pub monitor_container: String,
    pub monitor_url: String,
}

impl Default for SmfSettings {
    fn default() -> Self {
        Self {
            namespace: "fed-smf".to_string(),
            monitor_selector: "app=smfmonitor-app".to_string(),
            monitor_container: "smfmonitor".to_string(),
            monitor_url: "http://127.0.0.1:9090/tenv/SmfMonitorCliIf/smfmonitor-info".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct UpfSettings {
    pub namespace: String,
}

impl Default for UpfSettings {
    fn default() -> Self {
        Self {
            namespace: "fed-upf".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct KargoSettings {
    pub namespace: String,
    pub service: String,
}

impl Default for KargoSettings {
    fn default() -> Self {
        Self {
            namespace: "fed-paas-helpers".to_string(),
            service: "kargo".to_string(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// Trace-control port used when a container has no entry in `ports`
    pub default_port: u16,
    /// Trace-control port per container name
    pub ports: BTreeMap<String, u16>,
}

impl DebugSettings {
    pub fn port_for(&self, container: &str) -> u16 {
        self.ports
            .get(container)
            .copied()
            .unwrap_or(self.default_port)
    }
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            default_port: 9090,
            ports: BTreeMap::new(),
        }
    }
}

/// A component that is healthy when its namespace has pods (and services)
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PresenceTarget {
    pub label: String,
    /// Namespace expected to contain the component's pods
    pub namespace: String,
    /// Namespace expected to contain its services, when it differs from `namespace`
    #[serde(default)]
    pub service_namespace: Option<String>,
    #[serde(default = "default_true")]
    pub check_services: bool,
}

fn default_true() -> bool {
    true
}

impl PresenceTarget {
    /// Pods and services in the same namespace
    pub fn new(label: &str, namespace: &str) -> Self {
        Self {
            label: label.to_string(),
            namespace: namespace.to_string(),
            service_namespace: None,
            check_services: true,
        }
    }

    pub fn pods_only(label: &str, namespace: &str) -> Self {
        Self {
            check_services: false,
            ..Self::new(label, namespace)
        }
    }

    pub fn with_service_namespace(mut self, namespace: &str) -> Self {
        self.service_namespace = Some(namespace.to_string());
        self
    }

    /// Namespace to look for services in, `None` when services are not checked
    pub fn services_namespace(&self) -> Option<&str> {
        if !self.check_services {
            return None;
        }
        Some(self.service_namespace.as_deref().unwrap_or(&self.namespace))
    }
}

pub fn default_infra_targets() -> Vec<PresenceTarget> {
    vec![
        PresenceTarget::new("OPA", "fed-opa"),
        PresenceTarget::new("MetalLB", "fed-metallb-system").with_service_namespace("fed-metallb"),
        PresenceTarget::new("KubeAddons", "fed-kube-addons"),
        PresenceTarget::pods_only("FedRbac", "fed-rbac"),
    ]
}

pub fn default_paas_targets() -> Vec<PresenceTarget> {
    vec![
        PresenceTarget::new("Grafana", "fed-grafana"),
        PresenceTarget::new("Kibana", "fed-kibana"),
        PresenceTarget::new("Prometheus", "fed-prometheus"),
        PresenceTarget::new("Etcd", "fed-etcd"),
        PresenceTarget::new("Istio", "fed-istio-system"),
        PresenceTarget::new("KubeProm", "fed-kube-prom"),
        PresenceTarget::new("RedisOperator", "fed-redis-operator"),
        PresenceTarget::new("RedisCluster", "fed-redis-cluster"),
        PresenceTarget::new("Yaeger", "fed-yaeger"),
        PresenceTarget::new("Elastic", "fed-elastic"),
        PresenceTarget::new("ElastAlert", "fed-elastalert"),
        PresenceTarget::new("Alerta", "fed-alerta"),
        PresenceTarget::new("Kiali", "fed-kiali"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_settings_use_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.redis.namespace, "fed-redis-cluster");
        assert_eq!(settings.infra.len(), 4);
        assert_eq!(settings.paas.len(), 13);
        assert_eq!(settings.debug.port_for("anything"), 9090);
    }

    #[test]
    fn test_partial_override() {
        let settings: Settings = toml::from_str(
            r#"
            [redis]
            namespace = "redis"
            port = 7000

            [debug.ports]
            smf-app = 9191

            [[paas]]
            label = "Grafana"
            namespace = "monitoring"
            "#,
        )
        .unwrap();

        assert_eq!(settings.redis.service_address(), "redis-cluster.redis.svc.cluster.local:7000");
        assert_eq!(settings.redis.container, "redis-node");
        assert_eq!(settings.debug.port_for("smf-app"), 9191);
        assert_eq!(settings.paas.len(), 1);
        assert_eq!(settings.paas[0].services_namespace(), Some("monitoring"));
        // Sections not mentioned keep their defaults
        assert_eq!(settings.infra, default_infra_targets());
    }

    #[test]
    fn test_metallb_uses_separate_service_namespace() {
        let metallb = default_infra_targets()
            .into_iter()
            .find(|t| t.label == "MetalLB")
            .unwrap();
        assert_eq!(metallb.namespace, "fed-metallb-system");
        assert_eq!(metallb.services_namespace(), Some("fed-metallb"));
    }

    #[test]
    fn test_pods_only_target_skips_services() {
        let rbac = PresenceTarget::pods_only("FedRbac", "fed-rbac");
        assert_eq!(rbac.services_namespace(), None);
    }
}
