use k8s_openapi::api::{
    core::v1::Service,
    networking::v1::{
        HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
        IngressServiceBackend, IngressSpec, ServiceBackendPort,
    },
};
use kube::core::ObjectMeta;

use crate::resources::{
    exposure::{get_profile_annotations, ExposureProfile},
    labels::get_exposure_labels,
    ResourceGenerationError,
};

/// Generates the routing-rule half of an exposure: a single-rule ingress
/// forwarding `/<service-name>` to the service's declared port. Built from
/// the already-resolved service so the backend reference can never dangle.
pub fn generate_ingress(
    service: &Service,
    profile: &ExposureProfile,
) -> Result<Ingress, ResourceGenerationError> {
    let name = service
        .metadata
        .name
        .as_ref()
        .ok_or(ResourceGenerationError::DependentMissingMetadataName)?;
    let namespace = service
        .metadata
        .namespace
        .as_ref()
        .ok_or(ResourceGenerationError::DependentMissingMetadataNamespace)?;
    let port = get_first_port(service).ok_or(ResourceGenerationError::DependentMissingData(
        "service ports".into(),
    ))?;

    let path = HTTPIngressPath {
        path: Some(format!("/{name}")),
        path_type: profile.path_type.to_owned(),
        backend: IngressBackend {
            service: Some(IngressServiceBackend {
                name: name.to_owned(),
                port: Some(ServiceBackendPort {
                    number: Some(port),
                    ..Default::default()
                }),
            }),
            ..Default::default()
        },
    };

    Ok(Ingress {
        metadata: ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            labels: Some(get_exposure_labels()),
            annotations: get_profile_annotations(profile),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            ingress_class_name: profile.ingress_class.to_owned(),
            rules: Some(vec![IngressRule {
                http: Some(HTTPIngressRuleValue { paths: vec![path] }),
                ..Default::default()
            }]),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn get_first_port(service: &Service) -> Option<i32> {
    service
        .spec
        .as_ref()?
        .ports
        .as_ref()?
        .first()
        .map(|port| port.port)
}

#[cfg(test)]
mod tests {
    use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
    use kube::core::ObjectMeta;

    use crate::resources::{
        exposure::{ExposureProfile, ExposureProfileBuilder},
        ResourceGenerationError,
    };

    use super::generate_ingress;

    fn service(name: &str, port: Option<i32>) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(name.to_owned()),
                namespace: Some("default".to_owned()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                ports: port.map(|port| {
                    vec![ServicePort {
                        port,
                        ..Default::default()
                    }]
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn ingress_routes_a_single_prefix_path_to_the_service_port() {
        let ingress = generate_ingress(&service("web", Some(80)), &ExposureProfile::default())
            .unwrap();

        let rules = ingress.spec.as_ref().unwrap().rules.as_ref().unwrap();
        assert_eq!(rules.len(), 1);

        let paths = &rules[0].http.as_ref().unwrap().paths;
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].path.as_deref(), Some("/web"));
        assert_eq!(paths[0].path_type, "Prefix");

        let backend = paths[0].backend.service.as_ref().unwrap();
        assert_eq!(backend.name, "web");
        assert_eq!(backend.port.as_ref().unwrap().number, Some(80));
    }

    #[test]
    fn ingress_carries_the_profile_ingress_class() {
        let profile = ExposureProfileBuilder::default()
            .ingress_class(Some("nginx".to_owned()))
            .build()
            .unwrap();

        let ingress = generate_ingress(&service("web", Some(80)), &profile).unwrap();

        assert_eq!(
            ingress.spec.unwrap().ingress_class_name.as_deref(),
            Some("nginx")
        );
    }

    #[test]
    fn ingress_generation_requires_a_declared_service_port() {
        assert!(matches!(
            generate_ingress(&service("web", None), &ExposureProfile::default()),
            Err(ResourceGenerationError::DependentMissingData(_))
        ));
    }
}
