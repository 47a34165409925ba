use k8s_openapi::NamespaceResourceScope;
use kube::{Api, Client, Resource};

pub mod key;
pub mod operations;

pub trait GetApi {
    fn global_api<K>(&self) -> Api<K>
    where
        K: Resource,
        K::DynamicType: Default;

    fn namespaced_api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default;
}

impl GetApi for Client {
    fn global_api<K>(&self) -> Api<K>
    where
        K: Resource,
        K::DynamicType: Default,
    {
        Api::all(self.clone())
    }

    fn namespaced_api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        Api::namespaced(self.clone(), namespace)
    }
}
