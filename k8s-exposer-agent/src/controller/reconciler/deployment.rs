use k8s_exposer_core::{
    kubernetes::{
        key::ResourceKey,
        operations::{is_already_exists, is_not_found},
    },
    resources::{ingress::generate_ingress, service::generate_service},
};

use super::{context::ReconcilerContext, error::ReconcilerError};

#[derive(Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The deployment exists and its exposure resources are in place.
    Exposed,
    /// The deployment is gone and its exposure resources were removed.
    Removed,
}

/// Converges the exposure resources for one key.
///
/// Existence is decided by a direct read against the cluster, never the
/// local cache: between a deletion and the cache catching up, a cache
/// lookup would claim a live deployment is gone and tear its exposure down.
pub async fn reconcile_deployment(
    key: &ResourceKey,
    context: &ReconcilerContext,
) -> Result<ReconcileOutcome, ReconcilerError> {
    match context.deployments.get(key).await {
        Ok(Some(_)) => expose(key, context)
            .await
            .map(|_| ReconcileOutcome::Exposed),
        Ok(None) => teardown(key, context)
            .await
            .map(|_| ReconcileOutcome::Removed),
        Err(error) => Err(ReconcilerError::PrimaryReadError(key.clone(), error)),
    }
}

/// Creation path. Builds from the cached deployment; a cache miss defers the
/// attempt instead of creating a resource from incomplete data, and the
/// queue's backoff brings the key back once the cache caught up. An
/// already-existing service or ingress counts as converged state.
async fn expose(key: &ResourceKey, context: &ReconcilerContext) -> Result<(), ReconcilerError> {
    let deployment = context
        .deployments
        .cached(key)
        .ok_or_else(|| ReconcilerError::CacheOutOfSync(key.clone()))?;

    let service = generate_service(&deployment, &context.profile)?;
    let service = match context.exposures.create_service(key, &service).await {
        Ok(created) => created,
        Err(error) if is_already_exists(&error) => service,
        Err(error) => return Err(ReconcilerError::ServiceCreateError(key.clone(), error)),
    };

    let ingress = generate_ingress(&service, &context.profile)?;

    match context.exposures.create_ingress(key, &ingress).await {
        Ok(_) => Ok(()),
        Err(error) if is_already_exists(&error) => Ok(()),
        Err(error) => Err(ReconcilerError::IngressCreateError(key.clone(), error)),
    }
}

/// Deletion path. Both deletions are attempted regardless of the other's
/// outcome, and a missing resource is a success, which keeps the whole path
/// safe to retry.
async fn teardown(key: &ResourceKey, context: &ReconcilerContext) -> Result<(), ReconcilerError> {
    let service = context.exposures.delete_service(key).await;
    let ingress = context.exposures.delete_ingress(key).await;

    if let Err(error) = service {
        if !is_not_found(&error) {
            return Err(ReconcilerError::ServiceDeleteError(key.clone(), error));
        }
    }

    if let Err(error) = ingress {
        if !is_not_found(&error) {
            return Err(ReconcilerError::IngressDeleteError(key.clone(), error));
        }
    }

    Ok(())
}
