use std::collections::BTreeMap;

use k8s_openapi::api::{
    apps::v1::Deployment,
    core::v1::{Service, ServicePort, ServiceSpec},
};
use kube::core::ObjectMeta;

use crate::resources::{
    exposure::{get_profile_annotations, ExposureProfile},
    labels::get_exposure_labels,
    ResourceGenerationError,
};

/// Generates the network-exposing half of an exposure: a service named after
/// the deployment, selecting its pods by the pod-template label set.
pub fn generate_service(
    deployment: &Deployment,
    profile: &ExposureProfile,
) -> Result<Service, ResourceGenerationError> {
    let name = deployment
        .metadata
        .name
        .as_ref()
        .ok_or(ResourceGenerationError::DependentMissingMetadataName)?;
    let namespace = deployment
        .metadata
        .namespace
        .as_ref()
        .ok_or(ResourceGenerationError::DependentMissingMetadataNamespace)?;
    let selector = get_pod_template_labels(deployment)
        .ok_or(ResourceGenerationError::DependentMissingData(
            "pod template labels".into(),
        ))?;

    if selector.is_empty() {
        return Err(ResourceGenerationError::DependentInvalidData(
            "pod template labels".into(),
        ));
    }

    let port = ServicePort {
        name: Some(profile.port_name.to_owned()),
        port: profile.port,
        ..Default::default()
    };

    Ok(Service {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            labels: Some(get_exposure_labels()),
            annotations: get_profile_annotations(profile),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            selector: Some(selector.to_owned()),
            ports: Some(vec![port]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn get_pod_template_labels(deployment: &Deployment) -> Option<&BTreeMap<String, String>> {
    deployment
        .spec
        .as_ref()?
        .template
        .metadata
        .as_ref()?
        .labels
        .as_ref()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::api::{
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::PodTemplateSpec,
    };
    use kube::core::ObjectMeta;

    use crate::resources::{exposure::ExposureProfile, ResourceGenerationError};

    use super::generate_service;

    fn labeled_deployment(labels: BTreeMap<String, String>) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some("web".to_owned()),
                namespace: Some("default".to_owned()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(labels),
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn service_copies_the_pod_template_selector_verbatim() {
        let labels = BTreeMap::from([("app".to_owned(), "web".to_owned())]);
        let deployment = labeled_deployment(labels.clone());

        let service = generate_service(&deployment, &ExposureProfile::default()).unwrap();
        let spec = service.spec.unwrap();

        assert_eq!(service.metadata.name.as_deref(), Some("web"));
        assert_eq!(service.metadata.namespace.as_deref(), Some("default"));
        assert_eq!(spec.selector, Some(labels));

        let ports = spec.ports.unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port, 80);
        assert_eq!(ports[0].name.as_deref(), Some("http"));
    }

    #[test]
    fn service_generation_rejects_an_empty_selector() {
        let deployment = labeled_deployment(BTreeMap::new());

        assert!(matches!(
            generate_service(&deployment, &ExposureProfile::default()),
            Err(ResourceGenerationError::DependentInvalidData(_))
        ));
    }

    #[test]
    fn service_generation_rejects_a_nameless_deployment() {
        let mut deployment =
            labeled_deployment(BTreeMap::from([("app".to_owned(), "web".to_owned())]));
        deployment.metadata.name = None;

        assert!(matches!(
            generate_service(&deployment, &ExposureProfile::default()),
            Err(ResourceGenerationError::DependentMissingMetadataName)
        ));
    }

    #[test]
    fn service_generation_rejects_a_deployment_without_template_labels() {
        let mut deployment =
            labeled_deployment(BTreeMap::from([("app".to_owned(), "web".to_owned())]));
        deployment.spec = None;

        assert!(matches!(
            generate_service(&deployment, &ExposureProfile::default()),
            Err(ResourceGenerationError::DependentMissingData(_))
        ));
    }
}
