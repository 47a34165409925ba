use std::{
    collections::{HashMap, HashSet, VecDeque},
    hash::Hash,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::sync::Notify;

// matches the client-go default controller rate limiter curve
pub const BASE_RETRY_DELAY: Duration = Duration::from_millis(5);
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(1000);

/// A deduplicating, rate-limited FIFO of pending work items.
///
/// Items are merged while pending: adding a key that is already waiting in
/// the queue is a no-op, which gives the per-key at-most-one-in-flight
/// guarantee the worker loop relies on. Failed items come back through
/// [`WorkQueue::add_rate_limited`] with per-item exponential backoff;
/// [`WorkQueue::forget`] clears that history once an item converges.
pub struct WorkQueue<T> {
    inner: Mutex<Inner<T>>,
    notify: Notify,
    base_delay: Duration,
    max_delay: Duration,
}

struct Inner<T> {
    order: VecDeque<T>,
    pending: HashSet<T>,
    requeues: HashMap<T, u32>,
    shutting_down: bool,
}

impl<T> WorkQueue<T>
where
    T: Clone + Eq + Hash + Send + 'static,
{
    pub fn new() -> Self {
        Self::with_delays(BASE_RETRY_DELAY, MAX_RETRY_DELAY)
    }

    pub fn with_delays(base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                order: VecDeque::new(),
                pending: HashSet::new(),
                requeues: HashMap::new(),
                shutting_down: false,
            }),
            notify: Notify::new(),
            base_delay,
            max_delay,
        }
    }

    /// Enqueues an item unless an identical one is already pending.
    pub fn add(&self, item: T) {
        {
            let mut inner = self.inner.lock().unwrap();

            if inner.shutting_down || !inner.pending.insert(item.clone()) {
                return;
            }

            inner.order.push_back(item);
        }

        self.notify.notify_one();
    }

    /// Re-enqueues a failed item after its exponential backoff delay.
    pub fn add_rate_limited(self: &Arc<Self>, item: T) {
        let delay = {
            let mut inner = self.inner.lock().unwrap();

            if inner.shutting_down {
                return;
            }

            let requeues = inner.requeues.entry(item.clone()).or_insert(0);
            *requeues += 1;

            self.backoff_delay(*requeues)
        };

        let queue = self.clone();

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            queue.add(item);
        });
    }

    /// Clears the backoff history for an item. Does not touch the queue
    /// itself.
    pub fn forget(&self, item: &T) {
        self.inner.lock().unwrap().requeues.remove(item);
    }

    /// Number of rate-limited requeues since the item was last forgotten.
    pub fn requeues(&self, item: &T) -> u32 {
        self.inner
            .lock()
            .unwrap()
            .requeues
            .get(item)
            .copied()
            .unwrap_or(0)
    }

    /// Waits for the next item. Returns `None` once the queue is shutting
    /// down and the consumer should terminate.
    pub async fn get(&self) -> Option<T> {
        loop {
            let notified = self.notify.notified();

            {
                let mut inner = self.inner.lock().unwrap();

                if let Some(item) = inner.order.pop_front() {
                    inner.pending.remove(&item);
                    return Some(item);
                }

                if inner.shutting_down {
                    return None;
                }
            }

            notified.await;
        }
    }

    pub fn shut_down(&self) {
        self.inner.lock().unwrap().shutting_down = true;
        self.notify.notify_waiters();
        self.notify.notify_one();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn backoff_delay(&self, requeues: u32) -> Duration {
        let exponent = requeues.saturating_sub(1).min(32);

        self.base_delay
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::WorkQueue;

    #[tokio::test]
    async fn duplicate_items_are_merged_while_pending() {
        let queue = WorkQueue::new();

        queue.add("default/web");
        queue.add("default/web");
        queue.add("default/api");

        assert_eq!(queue.get().await, Some("default/web"));
        assert_eq!(queue.get().await, Some("default/api"));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn an_item_can_be_requeued_after_it_was_taken() {
        let queue = WorkQueue::new();

        queue.add("default/web");
        assert_eq!(queue.get().await, Some("default/web"));

        queue.add("default/web");
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn shutdown_unblocks_a_waiting_consumer() {
        let queue = Arc::new(WorkQueue::<&str>::new());
        let consumer = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.get().await })
        };

        tokio::task::yield_now().await;
        queue.shut_down();

        assert_eq!(consumer.await.unwrap(), None);
    }

    #[tokio::test]
    async fn items_are_ignored_after_shutdown() {
        let queue = WorkQueue::new();

        queue.shut_down();
        queue.add("default/web");

        assert_eq!(queue.get().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limited_items_come_back_after_the_backoff_delay() {
        let queue = Arc::new(WorkQueue::with_delays(
            Duration::from_millis(5),
            Duration::from_secs(1000),
        ));

        queue.add_rate_limited("default/web");
        assert!(queue.is_empty());
        assert_eq!(queue.requeues(&"default/web"), 1);

        // paused time advances once the consumer is the only runnable task
        assert_eq!(queue.get().await, Some("default/web"));
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_grows_until_the_item_is_forgotten() {
        let queue = Arc::new(WorkQueue::with_delays(
            Duration::from_millis(5),
            Duration::from_secs(1000),
        ));

        for _ in 0..3 {
            queue.add_rate_limited("default/web");
            queue.get().await;
        }

        assert_eq!(queue.requeues(&"default/web"), 3);

        queue.forget(&"default/web");
        assert_eq!(queue.requeues(&"default/web"), 0);
    }
}
