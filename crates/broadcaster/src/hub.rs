//! Event hub - fan-out of detection events to live subscribers
//!
//! Every processed result is serialized once and appended to each
//! registered subscriber queue independently; a slow or unconsumed
//! subscriber never blocks others or the results path. Queues are bounded
//! with drop-oldest, mirroring the frame buffer policy, so an abandoned
//! connection cannot grow without bound.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use contracts::ResultEvent;
use metrics::{counter, gauge};
use tokio::sync::Notify;
use tracing::{debug, instrument, warn};

/// What a subscriber stream loop yields next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Serialized event payload
    Data(String),
    /// Idle keep-alive
    Heartbeat,
    /// The hub shut down and the queue is drained; no transition re-opens
    Closed,
}

/// Per-connection ordered queue of pending payloads
struct SubscriberQueue {
    queue: Mutex<VecDeque<String>>,
    notify: Notify,
    capacity: usize,
    dropped: AtomicU64,
    closed: AtomicBool,
}

impl SubscriberQueue {
    fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            capacity,
            dropped: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    fn push(&self, payload: String) {
        {
            let mut queue = lock_unpoisoned(&self.queue);
            if queue.len() == self.capacity {
                queue.pop_front();
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            queue.push_back(payload);
        }
        self.notify.notify_one();
    }

    fn pop(&self) -> Option<String> {
        lock_unpoisoned(&self.queue).pop_front()
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct HubInner {
    subscribers: Mutex<HashMap<u64, Arc<SubscriberQueue>>>,
    next_id: AtomicU64,
    events_broadcast: AtomicU64,
}

impl HubInner {
    fn deregister(&self, id: u64) {
        let removed = lock_unpoisoned(&self.subscribers).remove(&id).is_some();
        if removed {
            debug!(subscriber = id, "subscriber deregistered");
            gauge!("edgesight_event_subscribers").decrement(1.0);
        }
    }
}

/// Live event broadcaster
///
/// Owns the active-subscriber set; subscribers register through
/// `subscribe` and deregister automatically when their `Subscription` is
/// dropped, including on abnormal disconnect.
pub struct EventHub {
    inner: Arc<HubInner>,
    queue_capacity: usize,
    heartbeat: Duration,
}

impl EventHub {
    /// Create a hub with the given per-subscriber queue bound and idle
    /// heartbeat interval
    pub fn new(queue_capacity: usize, heartbeat: Duration) -> Self {
        Self {
            inner: Arc::new(HubInner {
                subscribers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
                events_broadcast: AtomicU64::new(0),
            }),
            queue_capacity,
            heartbeat,
        }
    }

    /// Register a new subscriber
    pub fn subscribe(&self) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let queue = Arc::new(SubscriberQueue::new(self.queue_capacity));
        lock_unpoisoned(&self.inner.subscribers).insert(id, Arc::clone(&queue));
        gauge!("edgesight_event_subscribers").increment(1.0);
        debug!(subscriber = id, "subscriber registered");

        Subscription {
            id,
            queue,
            hub: Arc::clone(&self.inner),
            heartbeat: self.heartbeat,
        }
    }

    /// Append one event to every currently registered subscriber queue
    ///
    /// Returns the number of queues appended to. Serialization failure is
    /// logged and drops the event for all subscribers (never the caller).
    #[instrument(name = "hub_publish", skip_all, fields(frame_id = event.frame_id))]
    pub fn publish(&self, event: &ResultEvent) -> usize {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "event payload encode failed");
                return 0;
            }
        };

        let subscribers = lock_unpoisoned(&self.inner.subscribers);
        for queue in subscribers.values() {
            queue.push(payload.clone());
        }
        let fanout = subscribers.len();
        drop(subscribers);

        self.inner.events_broadcast.fetch_add(1, Ordering::Relaxed);
        counter!("edgesight_events_broadcast_total").increment(1);
        fanout
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        lock_unpoisoned(&self.inner.subscribers).len()
    }

    /// Total events published through this hub
    pub fn events_broadcast(&self) -> u64 {
        self.inner.events_broadcast.load(Ordering::Relaxed)
    }

    /// Close every subscriber stream
    ///
    /// Subscribers drain their remaining payloads, then observe `Closed`.
    pub fn shutdown(&self) {
        let mut subscribers = lock_unpoisoned(&self.inner.subscribers);
        for queue in subscribers.values() {
            queue.close();
        }
        let count = subscribers.len();
        subscribers.clear();
        drop(subscribers);
        gauge!("edgesight_event_subscribers").set(0.0);
        debug!(subscribers = count, "event hub shut down");
    }
}

/// Handle to one subscriber connection
///
/// Dropping the handle deregisters the queue, guaranteed even when the
/// connection ends abnormally. Per connection the stream follows
/// `OPEN -> (emit | heartbeat)* -> CLOSED`.
pub struct Subscription {
    id: u64,
    queue: Arc<SubscriberQueue>,
    hub: Arc<HubInner>,
    heartbeat: Duration,
}

impl Subscription {
    /// Subscriber identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Payloads dropped from this queue by the capacity bound
    pub fn dropped_count(&self) -> u64 {
        self.queue.dropped.load(Ordering::Relaxed)
    }

    /// Yield the next stream event
    ///
    /// Emits the oldest queued payload if present; otherwise waits up to the
    /// heartbeat interval and yields `Heartbeat`. After the hub shuts down
    /// the remaining payloads drain first, then every call yields `Closed`.
    pub async fn next_event(&mut self) -> StreamEvent {
        loop {
            if let Some(payload) = self.queue.pop() {
                return StreamEvent::Data(payload);
            }
            if self.queue.is_closed() {
                return StreamEvent::Closed;
            }

            match tokio::time::timeout(self.heartbeat, self.queue.notify.notified()).await {
                Ok(()) => continue,
                Err(_) => return StreamEvent::Heartbeat,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.deregister(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{BBox, Detection};

    fn event(frame_id: u64) -> ResultEvent {
        ResultEvent {
            ts: "2026-01-01T00:00:00Z".into(),
            frame_id,
            detections: vec![Detection {
                bbox: BBox {
                    x1: 0.0,
                    y1: 0.0,
                    x2: 1.0,
                    y2: 1.0,
                },
                score: 0.9,
                class_id: 0,
            }],
        }
    }

    #[tokio::test]
    async fn test_publish_fans_out_to_all_subscribers() {
        let hub = EventHub::new(16, Duration::from_secs(10));
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.publish(&event(1)), 2);

        let StreamEvent::Data(payload_a) = a.next_event().await else {
            panic!("expected data");
        };
        let StreamEvent::Data(payload_b) = b.next_event().await else {
            panic!("expected data");
        };
        assert_eq!(payload_a, payload_b);
        assert!(payload_a.contains("\"frame_id\":1"));
    }

    #[tokio::test]
    async fn test_slow_subscriber_does_not_block_others() {
        let hub = EventHub::new(4, Duration::from_secs(10));
        let _slow = hub.subscribe();
        let mut fast = hub.subscribe();

        for i in 0..10 {
            hub.publish(&event(i));
        }

        // The unconsumed slow queue saturated; the fast one still streams
        for _ in 0..4 {
            assert!(matches!(fast.next_event().await, StreamEvent::Data(_)));
        }
    }

    #[tokio::test]
    async fn test_bounded_queue_drops_oldest() {
        let hub = EventHub::new(2, Duration::from_secs(10));
        let mut sub = hub.subscribe();

        hub.publish(&event(1));
        hub.publish(&event(2));
        hub.publish(&event(3));

        let StreamEvent::Data(first) = sub.next_event().await else {
            panic!("expected data");
        };
        let StreamEvent::Data(second) = sub.next_event().await else {
            panic!("expected data");
        };
        assert!(first.contains("\"frame_id\":2"));
        assert!(second.contains("\"frame_id\":3"));
        assert_eq!(sub.dropped_count(), 1);
    }

    #[tokio::test]
    async fn test_drop_deregisters_queue() {
        let hub = EventHub::new(16, Duration::from_secs(10));
        let sub = hub.subscribe();
        assert_eq!(hub.subscriber_count(), 1);

        drop(sub);
        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(hub.publish(&event(1)), 0);
    }

    #[tokio::test]
    async fn test_idle_stream_emits_heartbeat() {
        let hub = EventHub::new(16, Duration::from_millis(30));
        let mut sub = hub.subscribe();

        assert_eq!(sub.next_event().await, StreamEvent::Heartbeat);
    }

    #[tokio::test]
    async fn test_shutdown_drains_then_closes() {
        let hub = EventHub::new(16, Duration::from_secs(10));
        let mut sub = hub.subscribe();

        hub.publish(&event(7));
        hub.shutdown();

        assert!(matches!(sub.next_event().await, StreamEvent::Data(_)));
        assert_eq!(sub.next_event().await, StreamEvent::Closed);
        assert_eq!(sub.next_event().await, StreamEvent::Closed);
    }
}
