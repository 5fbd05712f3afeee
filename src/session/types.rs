//! Session data types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::taxonomy::CanonicalTarget;
use crate::types::Transform;

/// One timestamped snapshot of canonical target transforms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds since the session start
    pub time: f64,
    pub transforms: BTreeMap<CanonicalTarget, Transform>,
}

impl Frame {
    pub fn new(time: f64, transforms: BTreeMap<CanonicalTarget, Transform>) -> Self {
        Self { time, transforms }
    }

    /// Frame with no tracked targets
    pub fn empty(time: f64) -> Self {
        Self::new(time, BTreeMap::new())
    }
}

/// A recorded session: a start time plus frames in append order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Wall-clock time recording started
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl Session {
    /// Create a new empty session starting at `start`
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            frames: Vec::new(),
        }
    }

    /// Create a new empty session starting now
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Time of the last frame in seconds, or 0 when empty
    pub fn duration(&self) -> f64 {
        self.frames.last().map(|f| f.time).unwrap_or(0.0)
    }

    /// Get the number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Check if the session is empty
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Whether frame times never decrease
    pub fn is_monotonic(&self) -> bool {
        self.frames.windows(2).all(|w| w[1].time >= w[0].time)
    }

    /// Short description for listings
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            start: self.start,
            frame_count: self.frames.len(),
            duration: self.duration(),
        }
    }
}

/// Listing information about a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub start: DateTime<Utc>,
    pub frame_count: usize,
    pub duration: f64,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} frames in {:.2}s",
            self.start.format("%Y-%m-%d %H:%M"),
            self.frame_count,
            self.duration
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_empty_session() {
        let session = Session::starting_now();
        assert!(session.is_empty());
        assert_eq!(session.frame_count(), 0);
        assert_eq!(session.duration(), 0.0);
        assert!(session.is_monotonic());
    }

    #[test]
    fn test_duration_is_last_frame_time() {
        let mut session = Session::starting_now();
        session.frames.push(Frame::empty(0.0));
        session.frames.push(Frame::empty(0.5));
        session.frames.push(Frame::empty(1.25));
        assert_eq!(session.duration(), 1.25);
        assert_eq!(session.frame_count(), 3);
    }

    #[test]
    fn test_monotonic_detection() {
        let mut session = Session::starting_now();
        session.frames.push(Frame::empty(0.2));
        session.frames.push(Frame::empty(0.1));
        assert!(!session.is_monotonic());
    }

    #[test]
    fn test_summary_display() {
        let start = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap();
        let mut session = Session::new(start);
        session.frames.push(Frame::empty(0.0));
        session.frames.push(Frame::empty(2.346));
        assert_eq!(session.summary().to_string(), "2024-03-09 14:05, 2 frames in 2.35s");
    }
}
