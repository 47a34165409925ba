use std::sync::Arc;

use async_trait::async_trait;
use k8s_exposer_core::{
    kubernetes::{
        key::ResourceKey,
        operations::{create_resource, delete_resource, try_get_resource},
    },
    resources::exposure::ExposureProfile,
};
use k8s_openapi::api::{apps::v1::Deployment, core::v1::Service, networking::v1::Ingress};
use kube::{
    runtime::reflector::{ObjectRef, Store},
    Client,
};

/// Read access to the primary resource. The authoritative read and the
/// cache lookup are deliberately separate operations: the cache may lag
/// behind the cluster, and only the reconciler knows which of the two a
/// given step is allowed to trust.
#[async_trait]
pub trait DeploymentSource: Send + Sync {
    /// Direct read against the cluster, bypassing the local cache.
    /// `None` means the deployment authoritatively does not exist.
    async fn get(&self, key: &ResourceKey) -> Result<Option<Deployment>, kube::Error>;

    /// Point-in-time lookup in the local watch cache.
    fn cached(&self, key: &ResourceKey) -> Option<Arc<Deployment>>;
}

/// Write access to the exposure resources this controller exclusively owns.
#[async_trait]
pub trait ExposureApi: Send + Sync {
    async fn create_service(
        &self,
        key: &ResourceKey,
        service: &Service,
    ) -> Result<Service, kube::Error>;

    async fn delete_service(&self, key: &ResourceKey) -> Result<(), kube::Error>;

    async fn create_ingress(
        &self,
        key: &ResourceKey,
        ingress: &Ingress,
    ) -> Result<Ingress, kube::Error>;

    async fn delete_ingress(&self, key: &ResourceKey) -> Result<(), kube::Error>;
}

pub struct ReconcilerContext {
    pub deployments: Arc<dyn DeploymentSource>,
    pub exposures: Arc<dyn ExposureApi>,
    pub profile: ExposureProfile,
}

pub struct ClusterDeploymentSource {
    pub client: Client,
    pub store: Store<Deployment>,
}

#[async_trait]
impl DeploymentSource for ClusterDeploymentSource {
    async fn get(&self, key: &ResourceKey) -> Result<Option<Deployment>, kube::Error> {
        try_get_resource(&self.client, &key.namespace, &key.name).await
    }

    fn cached(&self, key: &ResourceKey) -> Option<Arc<Deployment>> {
        self.store
            .get(&ObjectRef::new(&key.name).within(&key.namespace))
    }
}

pub struct ClusterExposureApi {
    pub client: Client,
}

#[async_trait]
impl ExposureApi for ClusterExposureApi {
    async fn create_service(
        &self,
        key: &ResourceKey,
        service: &Service,
    ) -> Result<Service, kube::Error> {
        create_resource(&self.client, &key.namespace, service).await
    }

    async fn delete_service(&self, key: &ResourceKey) -> Result<(), kube::Error> {
        delete_resource::<Service>(&self.client, &key.namespace, &key.name).await
    }

    async fn create_ingress(
        &self,
        key: &ResourceKey,
        ingress: &Ingress,
    ) -> Result<Ingress, kube::Error> {
        create_resource(&self.client, &key.namespace, ingress).await
    }

    async fn delete_ingress(&self, key: &ResourceKey) -> Result<(), kube::Error> {
        delete_resource::<Ingress>(&self.client, &key.namespace, &key.name).await
    }
}
