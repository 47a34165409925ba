use k8s_exposer_core::{kubernetes::key::ResourceKey, resources::ResourceGenerationError};
use thiserror::Error;

/// Every failure aborts the current attempt and is reported back to the
/// worker loop as one discriminated value; nothing is logged-and-continued
/// inside the reconciler itself.
#[derive(Debug, Error)]
pub enum ReconcilerError {
    #[error("Couldn't read the '{}' deployment from the cluster! Reason: {}", .0, .1)]
    PrimaryReadError(ResourceKey, kube::Error),
    #[error("The '{}' deployment is not in the local cache yet!", .0)]
    CacheOutOfSync(ResourceKey),
    #[error("Couldn't generate an exposure resource! Reason: {}", .0)]
    ResourceGenerationError(#[from] ResourceGenerationError),
    #[error("Couldn't create the '{}' service! Reason: {}", .0, .1)]
    ServiceCreateError(ResourceKey, kube::Error),
    #[error("Couldn't create the '{}' ingress! Reason: {}", .0, .1)]
    IngressCreateError(ResourceKey, kube::Error),
    #[error("Couldn't delete the '{}' service! Reason: {}", .0, .1)]
    ServiceDeleteError(ResourceKey, kube::Error),
    #[error("Couldn't delete the '{}' ingress! Reason: {}", .0, .1)]
    IngressDeleteError(ResourceKey, kube::Error),
}
