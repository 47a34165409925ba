use std::borrow::Cow;

use thiserror::Error;

pub mod exposure;
pub mod ingress;
pub mod labels;
pub mod service;

#[derive(Debug, Error)]
pub enum ResourceGenerationError {
    #[error("Provided dependent resource is missing a name!")]
    DependentMissingMetadataName,
    #[error("Provided dependent resource is missing a namespace!")]
    DependentMissingMetadataNamespace,
    #[error("Provided dependent resource is missing required data ({})!", .0)]
    DependentMissingData(Cow<'static, str>),
    #[error("Provided dependent resource contains invalid data ({})!", .0)]
    DependentInvalidData(Cow<'static, str>),
}
