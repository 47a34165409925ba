use std::collections::BTreeMap;
use std::env::var;

use derive_builder::Builder;

pub const DEFAULT_SERVICE_PORT: i32 = 80;
pub const DEFAULT_SERVICE_PORT_NAME: &str = "http";
pub const DEFAULT_PATH_TYPE: &str = "Prefix";

/// Deployment-profile knobs for the generated exposure resources. The
/// defaults reproduce the plain HTTP-on-80, prefix-routed setup; anything
/// else is a matter of building a different profile, not of code changes.
#[derive(Builder, Clone, Debug, PartialEq)]
#[builder(setter(into), default)]
pub struct ExposureProfile {
    /// Port declared on the generated service.
    pub port: i32,
    pub port_name: String,
    /// Match type of the single generated ingress path.
    pub path_type: String,
    pub ingress_class: Option<String>,
    /// Extra annotations stamped on both generated resources.
    pub annotations: BTreeMap<String, String>,
}

impl Default for ExposureProfile {
    fn default() -> Self {
        Self {
            port: DEFAULT_SERVICE_PORT,
            port_name: DEFAULT_SERVICE_PORT_NAME.to_owned(),
            path_type: DEFAULT_PATH_TYPE.to_owned(),
            ingress_class: None,
            annotations: BTreeMap::new(),
        }
    }
}

impl ExposureProfile {
    /// Reads profile overrides from the environment, falling back to the
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, ExposureProfileError> {
        let mut profile = Self::default();

        if let Ok(port) = var("EXPOSER_PORT") {
            profile.port = port
                .parse()
                .map_err(|_| ExposureProfileError::InvalidPort(port))?;
        }

        if let Ok(path_type) = var("EXPOSER_PATH_TYPE") {
            match path_type.as_str() {
                "Prefix" | "Exact" | "ImplementationSpecific" => profile.path_type = path_type,
                _ => return Err(ExposureProfileError::InvalidPathType(path_type)),
            }
        }

        if let Ok(class) = var("EXPOSER_INGRESS_CLASS") {
            profile.ingress_class = Some(class);
        }

        Ok(profile)
    }
}

pub fn get_profile_annotations(profile: &ExposureProfile) -> Option<BTreeMap<String, String>> {
    if profile.annotations.is_empty() {
        None
    } else {
        Some(profile.annotations.to_owned())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExposureProfileError {
    #[error("'{}' is not a valid port number!", .0)]
    InvalidPort(String),
    #[error("'{}' is not a valid ingress path type!", .0)]
    InvalidPathType(String),
}

#[cfg(test)]
mod tests {
    use super::{ExposureProfile, ExposureProfileBuilder};

    #[test]
    fn default_profile_exposes_plain_http() {
        let profile = ExposureProfile::default();

        assert_eq!(profile.port, 80);
        assert_eq!(profile.port_name, "http");
        assert_eq!(profile.path_type, "Prefix");
        assert_eq!(profile.ingress_class, None);
    }

    #[test]
    fn builder_overrides_selected_fields_only() {
        let profile = ExposureProfileBuilder::default()
            .port(8080)
            .ingress_class(Some("nginx".to_owned()))
            .build()
            .unwrap();

        assert_eq!(profile.port, 8080);
        assert_eq!(profile.ingress_class.as_deref(), Some("nginx"));
        assert_eq!(profile.path_type, "Prefix");
    }
}
