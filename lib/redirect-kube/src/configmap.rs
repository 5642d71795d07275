//! ConfigMap store: table = ConfigMap name, key = host, value = location

use async_trait::async_trait;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::{Api, Client};
use redirect_core::{LookupOutcome, RedirectMapping, RedirectStore, StoreError};
use tracing::debug;

/// Redirect store reading ConfigMaps from a single namespace
#[derive(Clone)]
pub struct ConfigMapStore {
    api: Api<ConfigMap>,
    namespace: String,
}

impl ConfigMapStore {
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
            namespace: namespace.to_string(),
        }
    }

    /// Connect using the in-cluster or local kubeconfig
    pub async fn connect(namespace: &str) -> anyhow::Result<Self> {
        let client = Client::try_default().await?;
        Ok(Self::new(client, namespace))
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Read the mapping for `host` out of a fetched ConfigMap
    pub fn mapping_from(config_map: &ConfigMap, host: &str) -> LookupOutcome {
        let location = config_map
            .data
            .as_ref()
            .and_then(|data| data.get(host))
            .cloned();

        match location {
            Some(location) => LookupOutcome::Found(RedirectMapping {
                host: host.to_string(),
                location: Some(location),
            }),
            None => LookupOutcome::Missing,
        }
    }
}

#[async_trait]
impl RedirectStore for ConfigMapStore {
    fn name(&self) -> &'static str {
        "ConfigMapStore"
    }

    async fn lookup(&self, table: &str, host: &str) -> LookupOutcome {
        match self.api.get_opt(table).await {
            Ok(Some(config_map)) => Self::mapping_from(&config_map, host),
            Ok(None) => {
                debug!("ConfigMap {}/{} does not exist", self.namespace, table);
                LookupOutcome::Missing
            }
            Err(e) => LookupOutcome::Failed(StoreError::Backend(e.to_string())),
        }
    }
}
