use std::sync::Arc;

use k8s_exposer_core::kubernetes::key::ResourceKey;
use k8s_openapi::api::apps::v1::Deployment;
use kube::runtime::watcher::Event;
use log::{debug, info, warn};
use tokio::sync::watch;

use super::queue::WorkQueue;

/// Turns watch notifications into queued keys.
///
/// Adds, updates and deletes all take the identical path: enqueue the key and
/// nothing else. The reconciler re-derives truth from the cluster, so the
/// event kind carries no meaning past the log line, and stale or reordered
/// notifications cannot corrupt anything.
pub struct EventRouter {
    queue: Arc<WorkQueue<ResourceKey>>,
    synced: watch::Sender<bool>,
}

impl EventRouter {
    pub fn new(queue: Arc<WorkQueue<ResourceKey>>) -> (Self, watch::Receiver<bool>) {
        let (synced, receiver) = watch::channel(false);

        (Self { queue, synced }, receiver)
    }

    pub fn route(&self, event: Event<Deployment>) {
        match event {
            Event::Applied(object) => self.observed_add(&object),
            Event::Deleted(object) => self.observed_delete(&object),
            Event::Restarted(objects) => self.observed_restart(&objects),
        }
    }

    fn observed_add(&self, object: &Deployment) {
        debug!("Observed an added or updated deployment");
        self.enqueue(object);
    }

    fn observed_delete(&self, object: &Deployment) {
        debug!("Observed a deleted deployment");
        self.enqueue(object);
    }

    /// A completed listing means the local cache now holds a full snapshot;
    /// every listed object is queued so pre-existing deployments converge too.
    fn observed_restart(&self, objects: &[Deployment]) {
        info!(
            "Deployment listing complete, queuing {} deployments...",
            objects.len()
        );

        for object in objects {
            self.enqueue(object);
        }

        let _ = self.synced.send(true);
    }

    fn enqueue(&self, object: &Deployment) {
        match ResourceKey::from_object(object) {
            Ok(key) => self.queue.add(key),
            // dead letter: a key that cannot be derived now will not derive
            // on a retry either, so the notification is dropped
            Err(error) => warn!("Dropping a notification for an unidentifiable object! Reason: {error}"),
        }
    }
}
