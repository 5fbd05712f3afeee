//! Core data types for anchor-replay
//!
//! # Main Types
//!
//! - [`Transform`] - Translation plus unit-quaternion rotation of one target
//! - [`RecorderState`] - Whether a recorder is capturing provider updates
//! - [`PlayerState`] - Whether a player is running a playback schedule
//!
//! Scale is never modeled; tracked anchors are rigid.

use serde::{Deserialize, Serialize};

/// Spatial transform of a tracked target
///
/// `rotation` is stored as `[x, y, z, w]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Translation in meters
    pub translation: [f32; 3],
    /// Unit quaternion `[x, y, z, w]`
    pub rotation: [f32; 4],
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform
    pub const IDENTITY: Transform = Transform {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
    };

    /// Create a transform from translation and rotation
    pub fn new(translation: [f32; 3], rotation: [f32; 4]) -> Self {
        Self {
            translation,
            rotation,
        }
    }

    /// Create a pure translation
    pub fn from_translation(translation: [f32; 3]) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Rotation of `angle` radians around the Y axis, at `translation`
    pub fn from_yaw(translation: [f32; 3], angle: f32) -> Self {
        let half = angle * 0.5;
        Self {
            translation,
            rotation: [0.0, half.sin(), 0.0, half.cos()],
        }
    }

    /// Check that every component is finite
    pub fn is_finite(&self) -> bool {
        self.translation.iter().all(|v| v.is_finite()) && self.rotation.iter().all(|v| v.is_finite())
    }

    /// Component-wise comparison within `epsilon`
    pub fn approx_eq(&self, other: &Transform, epsilon: f32) -> bool {
        self.translation
            .iter()
            .zip(other.translation.iter())
            .chain(self.rotation.iter().zip(other.rotation.iter()))
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

/// State of a session recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecorderState {
    /// Not observing the provider
    #[default]
    Idle,
    /// Appending provider updates to a session
    Recording,
}

impl RecorderState {
    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        matches!(self, RecorderState::Recording)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            RecorderState::Idle => "Idle",
            RecorderState::Recording => "Recording",
        }
    }
}

/// State of a session player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    /// No playback schedule running
    #[default]
    Idle,
    /// Publishing frames at the recorded cadence
    Playing,
}

impl PlayerState {
    /// Check if currently playing
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayerState::Playing)
    }

    /// Display name for the state
    pub fn display_name(&self) -> &'static str {
        match self {
            PlayerState::Idle => "Idle",
            PlayerState::Playing => "Playing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_is_default() {
        assert_eq!(Transform::default(), Transform::IDENTITY);
        assert!(Transform::IDENTITY.is_finite());
    }

    #[test]
    fn test_yaw_is_unit_quaternion() {
        let t = Transform::from_yaw([0.0, 1.5, 0.0], std::f32::consts::FRAC_PI_2);
        let norm: f32 = t.rotation.iter().map(|c| c * c).sum();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_approx_eq() {
        let a = Transform::from_translation([1.0, 2.0, 3.0]);
        let b = Transform::from_translation([1.0, 2.0, 3.000_001]);
        assert!(a.approx_eq(&b, 1e-5));
        assert!(!a.approx_eq(&Transform::IDENTITY, 1e-5));
    }

    #[test]
    fn test_non_finite_detected() {
        let t = Transform::from_translation([f32::NAN, 0.0, 0.0]);
        assert!(!t.is_finite());
    }

    #[test]
    fn test_states() {
        assert!(RecorderState::Recording.is_recording());
        assert!(!RecorderState::Idle.is_recording());
        assert!(PlayerState::Playing.is_playing());
        assert_eq!(PlayerState::default(), PlayerState::Idle);
        assert_eq!(RecorderState::Recording.display_name(), "Recording");
    }
}
