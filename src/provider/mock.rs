//! Mock Tracking Provider
//!
//! Publishes synthetic head and hand poses into a [`TrackingFeed`] from a
//! background thread, so recordings can be produced without tracking
//! hardware.
//!
//! Every snapshot contains the head, all 32 slots of both hands, and one
//! `either`-chirality palm that has no canonical representative. Hands sway
//! on a sine pattern; the head slowly yaws.
//!
//! # Example
//!
//! ```ignore
//! use anchor_replay::provider::{MockProvider, TrackingFeed};
//!
//! let feed = TrackingFeed::new();
//! let handle = MockProvider::new(feed.clone()).with_rate_hz(90).start();
//! // ... record ...
//! handle.stop();
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{ProviderFailure, TrackingFeed};
use crate::taxonomy::{NativeChirality, NativeHandLocation, NativeTarget, SkeletonJoint};
use crate::types::Transform;

/// Motion pattern of the synthetic hands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockMotion {
    /// Sway frequency in Hz
    pub frequency: f32,
    /// Sway amplitude in meters
    pub amplitude: f32,
}

impl Default for MockMotion {
    fn default() -> Self {
        Self {
            frequency: 0.5,
            amplitude: 0.1,
        }
    }
}

impl MockMotion {
    /// Generate a full provider snapshot at `elapsed_secs`
    pub fn snapshot(&self, elapsed_secs: f32) -> HashMap<NativeTarget, Transform> {
        let phase = 2.0 * std::f32::consts::PI * self.frequency * elapsed_secs;
        let sway = self.amplitude * phase.sin();
        let mut map = HashMap::with_capacity(67);

        map.insert(
            NativeTarget::Head,
            Transform::from_yaw([0.0, 1.6, 0.0], 0.25 * phase.sin()),
        );

        for (chirality, side) in [(NativeChirality::Left, -1.0f32), (NativeChirality::Right, 1.0)] {
            let wrist = [side * (0.25 + sway), 1.1 + 0.5 * sway, -0.3];
            let at = |dx: f32, dy: f32, dz: f32| Transform::from_translation([wrist[0] + side * dx, wrist[1] + dy, wrist[2] + dz]);

            map.insert(NativeTarget::hand(chirality, NativeHandLocation::Wrist), at(0.0, 0.0, 0.0));
            map.insert(NativeTarget::hand(chirality, NativeHandLocation::Palm), at(0.03, 0.0, -0.04));
            map.insert(NativeTarget::hand(chirality, NativeHandLocation::AboveHand), at(0.03, 0.08, -0.04));
            map.insert(NativeTarget::hand(chirality, NativeHandLocation::ThumbTip), at(-0.02, 0.01, -0.1));
            map.insert(NativeTarget::hand(chirality, NativeHandLocation::IndexFingerTip), at(0.02, 0.0, -0.17));

            for (i, joint) in SkeletonJoint::ALL.into_iter().enumerate() {
                let step = i as f32 * 0.006;
                map.insert(NativeTarget::joint(chirality, joint), at(step, 0.0, -step));
            }
        }

        map.insert(
            NativeTarget::hand(NativeChirality::Either, NativeHandLocation::Palm),
            Transform::from_translation([0.0, 1.1, -0.3]),
        );

        map
    }
}

/// Synthetic provider driving a [`TrackingFeed`]
#[derive(Debug, Clone)]
pub struct MockProvider {
    feed: TrackingFeed,
    rate_hz: u32,
    motion: MockMotion,
    fail_after: Option<u64>,
}

impl MockProvider {
    /// Create a provider publishing at 60 Hz
    pub fn new(feed: TrackingFeed) -> Self {
        Self {
            feed,
            rate_hz: 60,
            motion: MockMotion::default(),
            fail_after: None,
        }
    }

    pub fn with_rate_hz(mut self, rate_hz: u32) -> Self {
        self.rate_hz = rate_hz.max(1);
        self
    }

    pub fn with_motion(mut self, motion: MockMotion) -> Self {
        self.motion = motion;
        self
    }

    /// Report a provider failure once `updates` snapshots have been published
    pub fn with_failure_after(mut self, updates: u64) -> Self {
        self.fail_after = Some(updates);
        self
    }

    /// Start publishing on a background thread
    pub fn start(self) -> MockProviderHandle {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let interval = Duration::from_secs_f64(1.0 / self.rate_hz as f64);

        let thread = thread::spawn(move || {
            let start = Instant::now();
            let mut next_tick = start;
            let mut published = 0u64;

            while running_clone.load(Ordering::Relaxed) {
                let now = Instant::now();
                let elapsed = now.duration_since(start).as_secs_f32();
                self.feed.publish_at(self.motion.snapshot(elapsed), now);
                published += 1;

                if self.fail_after == Some(published) {
                    self.feed
                        .report_failure(ProviderFailure::new("mock provider: world tracking interrupted"));
                }

                next_tick += interval;
                let now = Instant::now();
                if next_tick > now {
                    thread::sleep(next_tick - now);
                } else {
                    next_tick = now;
                }
            }
            tracing::debug!("Mock provider stopped after {} updates", published);
            published
        });

        MockProviderHandle {
            running,
            thread: Some(thread),
        }
    }
}

/// Handle to a running [`MockProvider`]; dropping it stops the thread
#[derive(Debug)]
pub struct MockProviderHandle {
    running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<u64>>,
}

impl MockProviderHandle {
    /// Stop publishing and return the number of published snapshots
    pub fn stop(mut self) -> u64 {
        self.shutdown()
    }

    fn shutdown(&mut self) -> u64 {
        self.running.store(false, Ordering::Relaxed);
        self.thread
            .take()
            .and_then(|t| t.join().ok())
            .unwrap_or(0)
    }
}

impl Drop for MockProviderHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderEvent;
    use crate::taxonomy::{convert_snapshot, CANONICAL_TARGET_COUNT};

    #[test]
    fn test_snapshot_covers_every_canonical_target() {
        let snapshot = MockMotion::default().snapshot(0.25);
        let converted = convert_snapshot(&snapshot);
        assert_eq!(converted.transforms.len(), CANONICAL_TARGET_COUNT);
        assert_eq!(converted.dropped.len(), 1);
        assert!(snapshot.values().all(|t| t.is_finite()));
    }

    #[test]
    fn test_provider_publishes_until_stopped() {
        let feed = TrackingFeed::new();
        let rx = feed.subscribe(1024);
        let handle = MockProvider::new(feed.clone()).with_rate_hz(200).start();
        std::thread::sleep(Duration::from_millis(50));
        let published = handle.stop();

        assert!(published > 0);
        let received = rx.try_iter().filter(|e| matches!(e, ProviderEvent::Update(_))).count() as u64;
        assert_eq!(received, published);
    }

    #[test]
    fn test_injected_failure() {
        let feed = TrackingFeed::new();
        let rx = feed.subscribe(1024);
        let handle = MockProvider::new(feed.clone())
            .with_rate_hz(500)
            .with_failure_after(2)
            .start();
        std::thread::sleep(Duration::from_millis(40));
        handle.stop();

        assert!(feed.failure().is_some());
        assert!(rx.try_iter().any(|e| matches!(e, ProviderEvent::Failure(_))));
    }
}
