//! Kubernetes client for healthctl

use std::path::Path;

use anyhow::{Context, Result, bail};
use k8s_openapi::api::core::v1::{Namespace, Node, Pod, Service};
use kube::Api;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::debug;

use healthctl_types::{ClusterSummary, ContextInfo};

/// Label carried by control-plane nodes
const CONTROL_PLANE_LABEL: &str = "node-role.kubernetes.io/control-plane";

/// Kubernetes client wrapper
pub struct KubeClient {
    kubeconfig: Kubeconfig,
    current_context: Option<String>,
}

impl KubeClient {
    /// Load the kubeconfig from `path`, or from the default location
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let kubeconfig = match path {
            Some(path) => Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig at {}", path.display()))?,
            None => {
                Kubeconfig::read().context("Failed to read kubeconfig. Is kubectl configured?")?
            }
        };

        Ok(Self::from_kubeconfig(kubeconfig))
    }

    pub fn from_kubeconfig(kubeconfig: Kubeconfig) -> Self {
        let current_context = kubeconfig.current_context.clone();
        Self {
            kubeconfig,
            current_context,
        }
    }

    /// Get all available contexts from kubeconfig
    pub fn get_contexts(&self) -> Vec<ContextInfo> {
        self.kubeconfig
            .contexts
            .iter()
            .map(|ctx| {
                let context = ctx.context.as_ref();
                ContextInfo::new(
                    ctx.name.clone(),
                    context.map(|c| c.cluster.clone()).unwrap_or_default(),
                    context.and_then(|c| c.user.clone()).unwrap_or_default(),
                    context.and_then(|c| c.namespace.clone()),
                    Some(&ctx.name) == self.current_context.as_ref(),
                )
            })
            .collect()
    }

    /// Get the current context name
    pub fn current_context(&self) -> Option<&str> {
        self.current_context.as_deref()
    }

    /// Create a kube::Client for a specific context.
    /// The kubeconfig file itself is never modified.
    pub async fn client_for_context(&self, context_name: &str) -> Result<kube::Client> {
        let config = kube::Config::from_custom_kubeconfig(
            self.kubeconfig.clone(),
            &KubeConfigOptions {
                context: Some(context_name.to_string()),
                ..Default::default()
            },
        )
        .await
        .context(format!(
            "Failed to create config for context: {}",
            context_name
        ))?;

        kube::Client::try_from(config).context(format!(
            "Failed to create client for context: {}",
            context_name
        ))
    }

    /// Cluster name a context points at
    pub fn cluster_for_context(&self, context_name: &str) -> Option<&str> {
        self.kubeconfig
            .contexts
            .iter()
            .find(|c| c.name == context_name)
            .and_then(|c| c.context.as_ref())
            .map(|c| c.cluster.as_str())
    }

    /// API server URL of the cluster a context points at
    pub fn api_server_for_context(&self, context_name: &str) -> Option<&str> {
        let cluster_name = self.cluster_for_context(context_name)?;
        self.kubeconfig
            .clusters
            .iter()
            .find(|c| c.name == cluster_name)
            .and_then(|c| c.cluster.as_ref())
            .and_then(|c| c.server.as_deref())
    }

    /// Gather the header details for a connected context
    pub async fn cluster_summary(
        &self,
        client: &kube::Client,
        context_name: &str,
    ) -> Result<ClusterSummary> {
        let nodes: Api<Node> = Api::all(client.clone());
        let list = nodes
            .list(&ListParams::default())
            .await
            .context("Failed to list nodes")?;
        let (control_plane_nodes, worker_nodes) = count_node_roles(&list.items);

        // Version lookup is informational only
        let server_version = match client.apiserver_version().await {
            Ok(info) => Some(info.git_version),
            Err(e) => {
                debug!(error = %e, "Failed to fetch server version");
                None
            }
        };

        Ok(ClusterSummary {
            context: context_name.to_string(),
            cluster: self
                .cluster_for_context(context_name)
                .unwrap_or_default()
                .to_string(),
            api_server: self
                .api_server_for_context(context_name)
                .unwrap_or_default()
                .to_string(),
            control_plane_nodes,
            worker_nodes,
            server_version,
        })
    }

    /// Fetch all namespace names from the cluster
    pub async fn list_namespaces(&self, client: &kube::Client) -> Result<Vec<String>> {
        let namespaces: Api<Namespace> = Api::all(client.clone());
        let list = namespaces
            .list(&ListParams::default())
            .await
            .context("Failed to list namespaces")?;

        Ok(list
            .items
            .into_iter()
            .filter_map(|ns| ns.metadata.name)
            .collect())
    }

    /// Fetch pod names in a namespace, optionally restricted by a label selector
    pub async fn list_pods(
        &self,
        client: &kube::Client,
        namespace: &str,
        selector: Option<&str>,
    ) -> Result<Vec<String>> {
        list_pod_names(client, namespace, selector).await
    }

    /// Fetch the container names of a pod
    pub async fn list_containers(
        &self,
        client: &kube::Client,
        namespace: &str,
        pod: &str,
    ) -> Result<Vec<String>> {
        let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
        let pod = pods.get(pod).await.context(format!(
            "Failed to get pod '{}' in namespace '{}'",
            pod, namespace
        ))?;

        Ok(pod
            .spec
            .map(|spec| spec.containers.into_iter().map(|c| c.name).collect())
            .unwrap_or_default())
    }

    /// First LoadBalancer ingress address of a service
    pub async fn load_balancer_ip(
        &self,
        client: &kube::Client,
        namespace: &str,
        service: &str,
    ) -> Result<String> {
        let services: Api<Service> = Api::namespaced(client.clone(), namespace);
        let svc = services.get(service).await.context(format!(
            "Failed to get service '{}' in namespace '{}'",
            service, namespace
        ))?;

        match first_ingress_address(&svc) {
            Some(address) => Ok(address),
            None => bail!("No LoadBalancer ingress found for {} service", service),
        }
    }
}

/// Pod names in a namespace, shared with the diagnostics modules
pub(crate) async fn list_pod_names(
    client: &kube::Client,
    namespace: &str,
    selector: Option<&str>,
) -> Result<Vec<String>> {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let mut params = ListParams::default();
    if let Some(selector) = selector {
        params = params.labels(selector);
    }

    let list = pods
        .list(&params)
        .await
        .context(format!("Failed to list pods in {}", namespace))?;

    Ok(list
        .items
        .into_iter()
        .filter_map(|pod| pod.metadata.name)
        .collect())
}

/// Split nodes into (control plane, worker) counts
fn count_node_roles(nodes: &[Node]) -> (usize, usize) {
    let control_plane = nodes
        .iter()
        .filter(|node| {
            node.metadata
                .labels
                .as_ref()
                .is_some_and(|labels| labels.contains_key(CONTROL_PLANE_LABEL))
        })
        .count();
    (control_plane, nodes.len() - control_plane)
}

fn first_ingress_address(svc: &Service) -> Option<String> {
    let ingress = svc
        .status
        .as_ref()?
        .load_balancer
        .as_ref()?
        .ingress
        .as_ref()?
        .first()?;
    ingress.ip.clone().or_else(|| ingress.hostname.clone())
}
