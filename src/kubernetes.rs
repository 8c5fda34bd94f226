use crate::types::{KubectlOptions, PodRef};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::config::{KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Api, Client, Config, ResourceExt, api::ListParams};
use thiserror::Error;
use tracing::{debug, info};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("failed to read kubeconfig: {0}")]
    Kubeconfig(#[source] KubeconfigError),
    #[error("failed to load kubeconfig for context '{context}': {source}")]
    Config {
        context: String,
        #[source]
        source: KubeconfigError,
    },
    #[error("failed to build kubernetes client: {0}")]
    Client(#[source] kube::Error),
    #[error("failed to list pods in namespace {namespace} with selector '{selector}': {source}")]
    ListPods {
        namespace: String,
        selector: String,
        #[source]
        source: BoxError,
    },
}

#[async_trait]
pub trait PodLister: Send + Sync {
    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<PodRef>, ClusterError>;
}

/// A resolved cluster: the context name used for paths plus a way to list pods.
pub struct Connection<L> {
    pub context: String,
    pub pods: L,
}

#[async_trait]
pub trait ClusterConnector: Send + Sync {
    type Lister: PodLister;

    async fn connect(&self, options: &KubectlOptions)
    -> Result<Connection<Self::Lister>, ClusterError>;
}

/// Connects through the kubeconfig named by the options (or the default one).
#[derive(Debug, Clone, Copy, Default)]
pub struct KubeconfigConnector;

#[async_trait]
impl ClusterConnector for KubeconfigConnector {
    type Lister = ApiPodLister;

    async fn connect(
        &self,
        options: &KubectlOptions,
    ) -> Result<Connection<ApiPodLister>, ClusterError> {
        let kubeconfig = read_kubeconfig(options)?;
        let context = context_from_kubeconfig(options, &kubeconfig);

        let config = Config::from_custom_kubeconfig(
            kubeconfig,
            &KubeConfigOptions {
                context: options.context.clone(),
                ..Default::default()
            },
        )
        .await
        .map_err(|source| ClusterError::Config {
            context: context.clone(),
            source,
        })?;
        let client = Client::try_from(config).map_err(ClusterError::Client)?;
        info!("Initialized client for context: {}", context);

        Ok(Connection {
            context,
            pods: ApiPodLister { client },
        })
    }
}

fn read_kubeconfig(options: &KubectlOptions) -> Result<Kubeconfig, ClusterError> {
    match &options.config_path {
        Some(path) => Kubeconfig::read_from(path),
        None => Kubeconfig::read(),
    }
    .map_err(ClusterError::Kubeconfig)
}

/// The explicit context if one was given, otherwise the kubeconfig's current one.
pub fn context_from_kubeconfig(options: &KubectlOptions, kubeconfig: &Kubeconfig) -> String {
    options
        .context
        .clone()
        .or_else(|| kubeconfig.current_context.clone())
        .unwrap_or_else(|| "default".to_string())
}

pub struct ApiPodLister {
    client: Client,
}

#[async_trait]
impl PodLister for ApiPodLister {
    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<PodRef>, ClusterError> {
        let api: Api<Pod> = Api::namespaced(self.client.clone(), namespace);
        let list = api
            .list(&ListParams::default().labels(selector))
            .await
            .map_err(|e| ClusterError::ListPods {
                namespace: namespace.to_string(),
                selector: selector.to_string(),
                source: Box::new(e),
            })?;

        let pods: Vec<PodRef> = list
            .into_iter()
            .map(|pod| PodRef {
                namespace: pod.namespace().unwrap_or_else(|| namespace.to_string()),
                name: pod.name_any(),
            })
            .collect();
        debug!(namespace, selector, count = pods.len(), "listed pods");
        Ok(pods)
    }
}
