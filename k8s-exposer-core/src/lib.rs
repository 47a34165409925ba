pub mod helpers;
pub mod kubernetes;
pub mod resources;

pub const EXPOSER_MANAGER_NAME: &str = "k8s-exposer";
