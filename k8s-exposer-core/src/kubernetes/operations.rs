use std::fmt::Debug;

use k8s_openapi::{
    serde::{de::DeserializeOwned, Serialize},
    NamespaceResourceScope,
};
use kube::{
    api::{DeleteParams, PostParams},
    error::ErrorResponse,
    Client, Resource,
};
use log::info;

use crate::helpers::pretty_type_name;

use super::GetApi;

/// The authoritative read and the teardown path both need to tell "the
/// object is gone" apart from every other failure class.
pub fn is_not_found(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(ErrorResponse { code: 404, .. }))
}

/// Create calls treat an already existing object as converged state rather
/// than a conflict to resolve.
pub fn is_already_exists(error: &kube::Error) -> bool {
    matches!(error, kube::Error::Api(ErrorResponse { code: 409, .. }))
}

pub fn not_found_response(message: &str) -> ErrorResponse {
    ErrorResponse {
        status: "Failure".to_owned(),
        message: message.to_owned(),
        reason: "NotFound".to_owned(),
        code: 404,
    }
}

pub fn already_exists_response(message: &str) -> ErrorResponse {
    ErrorResponse {
        status: "Failure".to_owned(),
        message: message.to_owned(),
        reason: "AlreadyExists".to_owned(),
        code: 409,
    }
}

/// Direct read against the cluster; `None` means the object authoritatively
/// does not exist.
pub async fn try_get_resource<T>(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<Option<T>, kube::Error>
where
    T: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
    T::DynamicType: Default,
{
    client.namespaced_api::<T>(namespace).get_opt(name).await
}

pub async fn create_resource<T>(
    client: &Client,
    namespace: &str,
    resource: &T,
) -> Result<T, kube::Error>
where
    T: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Serialize + Debug,
    T::DynamicType: Default,
{
    let name = resource.meta().name.as_deref().unwrap_or_default();

    info!(
        "Creating '{name}' {} resource on the cluster...",
        pretty_type_name::<T>()
    );

    client
        .namespaced_api::<T>(namespace)
        .create(&PostParams::default(), resource)
        .await
}

pub async fn delete_resource<T>(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<(), kube::Error>
where
    T: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
    T::DynamicType: Default,
{
    info!(
        "Deleting '{name}' {} resource from the cluster...",
        pretty_type_name::<T>()
    );

    client
        .namespaced_api::<T>(namespace)
        .delete(name, &DeleteParams::default())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{already_exists_response, is_already_exists, is_not_found, not_found_response};

    #[test]
    fn error_classes_are_distinguished_by_status_code() {
        let not_found = kube::Error::Api(not_found_response("no such deployment"));
        let conflict = kube::Error::Api(already_exists_response("service exists"));

        assert!(is_not_found(&not_found));
        assert!(!is_already_exists(&not_found));
        assert!(is_already_exists(&conflict));
        assert!(!is_not_found(&conflict));
    }
}
