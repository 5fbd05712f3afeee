//! Tracking provider boundary
//!
//! The live provider is consumed only as a stream of snapshots (native target
//! to transform) plus an error channel. Providers push into a
//! [`TrackingFeed`]; consumers such as the recorder subscribe to it and
//! receive [`ProviderEvent`]s over crossbeam channels in publish order.
//!
//! Subscriber channels are bounded. A [`Delivery::Blocking`] subscriber (the
//! recorder) applies backpressure: `publish` waits for room instead of losing
//! updates. A [`Delivery::Lossy`] subscriber drops events that do not fit, so
//! a stalled display or logger never holds up the provider. Sends happen
//! outside the subscriber registry lock; subscribing never waits on a
//! publish. Dropping the receiver unsubscribes; the feed prunes it on the
//! next publish.

pub mod mock;

pub use mock::{MockMotion, MockProvider, MockProviderHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::taxonomy::NativeTarget;
use crate::types::Transform;

/// Default capacity of a subscriber channel
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 256;

/// One snapshot of every target the provider currently tracks
#[derive(Debug, Clone)]
pub struct ProviderUpdate {
    pub transforms: HashMap<NativeTarget, Transform>,
    /// When the provider produced the snapshot
    pub at: Instant,
}

/// Failure reported by the tracking subsystem
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProviderFailure {
    pub message: String,
}

impl ProviderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Event delivered to feed subscribers
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    Update(ProviderUpdate),
    Failure(ProviderFailure),
}

/// What `publish` does when a subscriber channel is full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Wait for room; nothing is lost
    Blocking,
    /// Drop the event for this subscriber
    Lossy,
}

#[derive(Debug, Clone)]
struct Subscriber {
    tx: Sender<ProviderEvent>,
    delivery: Delivery,
}

#[derive(Debug, Default)]
struct FeedInner {
    subscribers: Mutex<Vec<Subscriber>>,
    // Serializes publishers so every subscriber sees one order
    publish: Mutex<()>,
    lost_events: AtomicU64,
    latest: RwLock<Option<ProviderUpdate>>,
    failure: RwLock<Option<ProviderFailure>>,
}

/// Push interface between a tracking provider and its consumers
///
/// Cloning yields another handle to the same feed.
#[derive(Debug, Clone, Default)]
pub struct TrackingFeed {
    inner: Arc<FeedInner>,
}

impl TrackingFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to future events; events that find the channel full are dropped
    pub fn subscribe(&self, capacity: usize) -> Receiver<ProviderEvent> {
        self.subscribe_with(capacity, Delivery::Lossy)
    }

    /// Subscribe to every future event; a full channel makes `publish` wait
    pub fn subscribe_blocking(&self, capacity: usize) -> Receiver<ProviderEvent> {
        self.subscribe_with(capacity, Delivery::Blocking)
    }

    pub fn subscribe_with(&self, capacity: usize, delivery: Delivery) -> Receiver<ProviderEvent> {
        let (tx, rx) = bounded(capacity.max(1));
        self.inner.subscribers.lock().push(Subscriber { tx, delivery });
        rx
    }

    /// Publish a snapshot stamped with the current time
    pub fn publish(&self, transforms: HashMap<NativeTarget, Transform>) {
        self.publish_at(transforms, Instant::now());
    }

    /// Publish a snapshot produced at `at`
    pub fn publish_at(&self, transforms: HashMap<NativeTarget, Transform>, at: Instant) {
        let update = ProviderUpdate { transforms, at };
        *self.inner.latest.write() = Some(update.clone());
        self.broadcast(ProviderEvent::Update(update));
    }

    /// Record a tracking-subsystem failure and notify subscribers
    pub fn report_failure(&self, failure: ProviderFailure) {
        tracing::warn!("Tracking provider failure: {}", failure);
        *self.inner.failure.write() = Some(failure.clone());
        self.broadcast(ProviderEvent::Failure(failure));
    }

    /// Clear the recorded failure (e.g. after the provider restarted)
    pub fn clear_failure(&self) {
        *self.inner.failure.write() = None;
    }

    /// Most recent snapshot, if any was published
    pub fn latest(&self) -> Option<ProviderUpdate> {
        self.inner.latest.read().clone()
    }

    /// Most recent failure, if not cleared
    pub fn failure(&self) -> Option<ProviderFailure> {
        self.inner.failure.read().clone()
    }

    /// Number of live subscribers (as of the last publish)
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Events dropped for lossy subscribers whose channel was full
    pub fn lost_events(&self) -> u64 {
        self.inner.lost_events.load(Ordering::Relaxed)
    }

    fn broadcast(&self, event: ProviderEvent) {
        let _order = self.inner.publish.lock();
        let subscribers = self.inner.subscribers.lock().clone();

        let mut disconnected = Vec::new();
        for subscriber in &subscribers {
            let connected = match subscriber.delivery {
                Delivery::Blocking => subscriber.tx.send(event.clone()).is_ok(),
                Delivery::Lossy => match subscriber.tx.try_send(event.clone()) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        self.inner.lost_events.fetch_add(1, Ordering::Relaxed);
                        true
                    }
                    Err(TrySendError::Disconnected(_)) => false,
                },
            };
            if !connected {
                disconnected.push(subscriber.tx.clone());
            }
        }

        if !disconnected.is_empty() {
            self.inner
                .subscribers
                .lock()
                .retain(|s| !disconnected.iter().any(|tx| tx.same_channel(&s.tx)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn head_snapshot(y: f32) -> HashMap<NativeTarget, Transform> {
        let mut map = HashMap::new();
        map.insert(NativeTarget::Head, Transform::from_translation([0.0, y, 0.0]));
        map
    }

    #[test]
    fn test_events_arrive_in_publish_order() {
        let feed = TrackingFeed::new();
        let rx = feed.subscribe(8);

        feed.publish(head_snapshot(1.0));
        feed.report_failure(ProviderFailure::new("world tracking unavailable"));
        feed.publish(head_snapshot(2.0));

        assert!(matches!(rx.try_recv(), Ok(ProviderEvent::Update(u)) if u.transforms[&NativeTarget::Head].translation[1] == 1.0));
        assert!(matches!(rx.try_recv(), Ok(ProviderEvent::Failure(_))));
        assert!(matches!(rx.try_recv(), Ok(ProviderEvent::Update(u)) if u.transforms[&NativeTarget::Head].translation[1] == 2.0));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let feed = TrackingFeed::new();
        let rx = feed.subscribe(4);
        let _other = feed.subscribe(4);
        assert_eq!(feed.subscriber_count(), 2);

        drop(rx);
        feed.publish(head_snapshot(1.0));
        assert_eq!(feed.subscriber_count(), 1);
    }

    #[test]
    fn test_latest_and_failure_state() {
        let feed = TrackingFeed::new();
        assert!(feed.latest().is_none());
        assert!(feed.failure().is_none());

        feed.publish(head_snapshot(1.5));
        feed.report_failure(ProviderFailure::new("lost"));
        assert_eq!(feed.latest().unwrap().transforms.len(), 1);
        assert_eq!(feed.failure(), Some(ProviderFailure::new("lost")));

        feed.clear_failure();
        assert!(feed.failure().is_none());
    }

    #[test]
    fn test_clones_share_subscribers() {
        let feed = TrackingFeed::new();
        let rx = feed.subscribe(4);
        let provider_side = feed.clone();
        provider_side.publish(head_snapshot(1.0));
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_stalled_subscriber_does_not_block_feed() {
        let feed = TrackingFeed::new();
        let _stalled = feed.subscribe(1);
        let rx = feed.subscribe_blocking(16);

        let provider_side = feed.clone();
        let publisher = std::thread::spawn(move || {
            for i in 0..3 {
                provider_side.publish(head_snapshot(i as f32));
            }
        });
        publisher.join().unwrap();

        // Registry is free while the stalled channel stays full
        let late = feed.subscribe(4);
        assert_eq!(feed.subscriber_count(), 3);

        assert_eq!(rx.try_iter().count(), 3);
        assert_eq!(feed.lost_events(), 2);

        feed.publish(head_snapshot(4.0));
        assert!(late.try_recv().is_ok());
        assert_eq!(feed.lost_events(), 3);
    }

    #[test]
    fn test_blocking_subscriber_waits_for_room() {
        let feed = TrackingFeed::new();
        let rx = feed.subscribe_blocking(1);

        let provider_side = feed.clone();
        let publisher = std::thread::spawn(move || {
            for i in 0..20 {
                provider_side.publish(head_snapshot(i as f32));
            }
        });

        let received: Vec<f32> = (0..20)
            .map(|_| match rx.recv().unwrap() {
                ProviderEvent::Update(u) => u.transforms[&NativeTarget::Head].translation[1],
                ProviderEvent::Failure(f) => panic!("unexpected failure {}", f),
            })
            .collect();
        publisher.join().unwrap();

        assert_eq!(received, (0..20).map(|i| i as f32).collect::<Vec<_>>());
        assert_eq!(feed.lost_events(), 0);
    }
}
