//! Test data builders for creating test objects

use anchor_replay::{CanonicalTarget, Frame, Session, Transform};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::BTreeMap;

/// Builder for creating test Sessions
pub struct SessionBuilder {
    start: DateTime<Utc>,
    frames: Vec<Frame>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap(),
            frames: Vec::new(),
        }
    }

    /// Shift the start time by whole seconds
    pub fn start_offset(mut self, seconds: i64) -> Self {
        self.start += Duration::seconds(seconds);
        self
    }

    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.start = start;
        self
    }

    /// Add a frame tracking only the head at height `time`
    pub fn frame(mut self, time: f64) -> Self {
        let mut transforms = BTreeMap::new();
        transforms.insert(
            CanonicalTarget::Head,
            Transform::from_translation([0.0, 1.6, time as f32]),
        );
        self.frames.push(Frame::new(time, transforms));
        self
    }

    /// Add head-only frames at each of `times`
    pub fn frames(self, times: &[f64]) -> Self {
        times.iter().fold(self, |builder, &t| builder.frame(t))
    }

    pub fn build(self) -> Session {
        Session {
            start: self.start,
            frames: self.frames,
        }
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_builder() {
        let session = SessionBuilder::new()
            .start_offset(60)
            .frames(&[0.0, 0.5])
            .build();

        assert_eq!(session.frame_count(), 2);
        assert_eq!(session.duration(), 0.5);
        assert_eq!(
            session.start,
            Utc.with_ymd_and_hms(2024, 3, 9, 12, 1, 0).unwrap()
        );
    }
}
