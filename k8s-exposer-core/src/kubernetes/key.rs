use std::fmt::{self, Display};

use kube::Resource;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("Object is missing a metadata name!")]
    MissingName,
    #[error("Object is missing a metadata namespace!")]
    MissingNamespace,
}

/// Identity of a namespaced object, the only thing the work queue carries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: namespace.to_owned(),
            name: name.to_owned(),
        }
    }

    /// Derives the key from object metadata. The derivation is a pure
    /// function of the metadata, so add and delete notifications for the
    /// same object always produce an identical key.
    pub fn from_object<K: Resource>(object: &K) -> Result<Self, KeyError> {
        let meta = object.meta();
        let name = meta.name.as_ref().ok_or(KeyError::MissingName)?;
        let namespace = meta.namespace.as_ref().ok_or(KeyError::MissingNamespace)?;

        Ok(Self::new(namespace, name))
    }
}

impl Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
