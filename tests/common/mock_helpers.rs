//! Provider feed helpers

use anchor_replay::taxonomy::{NativeChirality, NativeHandLocation, NativeTarget};
use anchor_replay::Transform;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Snapshot with the head, one palm, and one target that has no canonical slot
pub fn tracked_snapshot(y: f32) -> HashMap<NativeTarget, Transform> {
    let mut map = HashMap::new();
    map.insert(NativeTarget::Head, Transform::from_translation([0.0, y, 0.0]));
    map.insert(
        NativeTarget::hand(NativeChirality::Left, NativeHandLocation::Palm),
        Transform::from_translation([-0.2, y - 0.5, -0.3]),
    );
    map.insert(
        NativeTarget::hand(NativeChirality::Either, NativeHandLocation::Palm),
        Transform::IDENTITY,
    );
    map
}

/// Poll `condition` until it holds or `timeout` elapses
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}
