use std::{sync::Arc, time::Duration};

use futures::{future::BoxFuture, FutureExt, StreamExt};
use k8s_exposer_core::{
    kubernetes::{key::ResourceKey, GetApi},
    resources::exposure::ExposureProfile,
};
use k8s_openapi::api::apps::v1::Deployment;
use kube::{
    runtime::{
        reflector::{self, reflector},
        watcher::{watcher, Config},
    },
    Client,
};
use log::{info, warn};
use tokio::{join, sync::watch, time::sleep};
use tokio_util::sync::CancellationToken;

use self::{
    queue::WorkQueue,
    reconciler::{
        context::{ClusterDeploymentSource, ClusterExposureApi, ReconcilerContext},
        deployment::{reconcile_deployment, ReconcileOutcome},
    },
    router::EventRouter,
};

pub mod queue;
pub mod reconciler;
pub mod router;

const WORKER_RESTART_INTERVAL: Duration = Duration::from_secs(1);

/// The exposure controller: one deployment reflector feeding a deduplicating
/// work queue through the event router, drained by a single worker that
/// converges one key at a time.
pub struct Controller {
    queue: Arc<WorkQueue<ResourceKey>>,
    context: Arc<ReconcilerContext>,
    synced: watch::Receiver<bool>,
    events: BoxFuture<'static, ()>,
}

impl Controller {
    pub fn new(client: Client, profile: ExposureProfile) -> Self {
        let queue = Arc::new(WorkQueue::new());
        let (router, synced) = EventRouter::new(queue.clone());

        let (store, writer) = reflector::store();
        let deployment_watcher = watcher(client.global_api::<Deployment>(), Config::default());
        let events = reflector(writer, deployment_watcher)
            .for_each(move |event| {
                match event {
                    Ok(event) => router.route(event),
                    Err(error) => warn!("Deployment watch interrupted! Reason: {error}"),
                }

                std::future::ready(())
            })
            .boxed();

        let context = ReconcilerContext {
            deployments: Arc::new(ClusterDeploymentSource {
                client: client.clone(),
                store,
            }),
            exposures: Arc::new(ClusterExposureApi { client }),
            profile,
        };

        Self {
            queue,
            context: Arc::new(context),
            synced,
            events,
        }
    }

    /// Runs until the token is cancelled: drives the watch pipeline, waits
    /// for the initial cache sync, then drains the queue. Cancellation shuts
    /// the queue down, which terminates the worker.
    pub async fn run(self, cancel: CancellationToken) {
        info!("Starting the exposure controller...");

        let Self {
            queue,
            context,
            mut synced,
            events,
        } = self;

        let watch = async {
            tokio::select! {
                _ = cancel.cancelled() => (),
                _ = events => (),
            }

            queue.shut_down();
        };

        let work = async {
            if !wait_for_cache_sync(&mut synced, &cancel).await {
                warn!("Shutting down before the deployment cache synced!");
                return;
            }

            info!(
                "Deployment cache synced, {} deployments queued, starting the worker...",
                queue.len()
            );

            loop {
                run_worker(&queue, &context).await;

                // the queue only closes on shutdown; if the worker ever
                // returns early it is restarted on a fixed cadence
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(WORKER_RESTART_INTERVAL) => (),
                }
            }
        };

        join!(watch, work);

        info!("Exposure controller stopped!");
    }
}

async fn wait_for_cache_sync(
    synced: &mut watch::Receiver<bool>,
    cancel: &CancellationToken,
) -> bool {
    while !*synced.borrow() {
        tokio::select! {
            _ = cancel.cancelled() => return false,
            changed = synced.changed() => {
                if changed.is_err() {
                    return false;
                }
            }
        }
    }

    true
}

async fn run_worker(queue: &Arc<WorkQueue<ResourceKey>>, context: &ReconcilerContext) {
    while process_next(queue, context).await {}
}

/// One worker iteration. Returns `false` once the queue shuts down. A
/// converged key has its backoff history forgotten; a failed one is
/// re-queued through the rate limiter so retries back off per key.
async fn process_next(queue: &Arc<WorkQueue<ResourceKey>>, context: &ReconcilerContext) -> bool {
    let Some(key) = queue.get().await else {
        return false;
    };

    match reconcile_deployment(&key, context).await {
        Ok(ReconcileOutcome::Exposed) => {
            info!("Reconciled '{key}', exposure resources are in place");
            queue.forget(&key);
        }
        Ok(ReconcileOutcome::Removed) => {
            info!("Reconciled '{key}', exposure resources removed");
            queue.forget(&key);
        }
        Err(error) => {
            warn!(
                "Couldn't reconcile '{key}' (attempt {})! Reason: {error}",
                queue.requeues(&key) + 1
            );
            queue.add_rate_limited(key);
        }
    }

    true
}
