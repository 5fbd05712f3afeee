//! Target taxonomy
//!
//! Bidirectional mapping between the provider's native target identifiers
//! and the closed canonical set used in recordings.
//!
//! - [`to_native`] is total: every canonical target has exactly one native
//!   representation.
//! - [`to_canonical`] is partial: ambiguous chirality, world/plane/image/object
//!   anchors and unknown categories have no canonical representative.
//!
//! The native space has synonyms. [`NativeTarget::Device`] collapses onto
//! [`CanonicalTarget::Head`], so `to_native(to_canonical(n))` need not give
//! back `n`. `to_canonical(to_native(c)) == Ok(c)` always holds.

pub mod canonical;
pub mod native;

pub use canonical::{CanonicalJoint, CanonicalTarget, Chirality, HandSlot, CANONICAL_TARGET_COUNT};
pub use native::{NativeChirality, NativeHandLocation, NativeTarget, PlaneAlignment, SkeletonJoint};

use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::types::Transform;

/// Why a native target has no canonical representative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// `either` hand
    AmbiguousChirality,
    /// World, plane, image, or reference anchors are not recorded
    AnchorCategory,
    /// Hand location without a canonical slot
    UnknownHandLocation,
    /// Category this crate does not know
    UnknownCategory,
}

/// A native target that cannot be persisted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no canonical target for {target} ({reason:?})")]
pub struct UnsupportedTarget {
    pub target: String,
    pub reason: UnsupportedReason,
}

impl UnsupportedTarget {
    fn new(target: &NativeTarget, reason: UnsupportedReason) -> Self {
        Self {
            target: target.to_string(),
            reason,
        }
    }
}

/// Convert a provider target into the canonical space
pub fn to_canonical(target: &NativeTarget) -> Result<CanonicalTarget, UnsupportedTarget> {
    match target {
        NativeTarget::Head | NativeTarget::Device => Ok(CanonicalTarget::Head),
        NativeTarget::Hand {
            chirality,
            location,
        } => {
            let chirality = match chirality {
                NativeChirality::Left => Chirality::Left,
                NativeChirality::Right => Chirality::Right,
                NativeChirality::Either => {
                    return Err(UnsupportedTarget::new(target, UnsupportedReason::AmbiguousChirality))
                }
            };
            let slot = match location {
                NativeHandLocation::ThumbTip => HandSlot::ThumbTip,
                NativeHandLocation::IndexFingerTip => HandSlot::IndexFingerTip,
                NativeHandLocation::Wrist => HandSlot::Wrist,
                NativeHandLocation::Palm => HandSlot::Palm,
                NativeHandLocation::AboveHand => HandSlot::AboveHand,
                NativeHandLocation::Joint(joint) => HandSlot::Joint(joint_to_canonical(*joint)),
                NativeHandLocation::Other(_) => {
                    return Err(UnsupportedTarget::new(target, UnsupportedReason::UnknownHandLocation))
                }
            };
            Ok(CanonicalTarget::Hand(chirality, slot))
        }
        NativeTarget::World
        | NativeTarget::Plane { .. }
        | NativeTarget::Image { .. }
        | NativeTarget::ReferenceImage { .. }
        | NativeTarget::ReferenceObject { .. } => {
            Err(UnsupportedTarget::new(target, UnsupportedReason::AnchorCategory))
        }
        NativeTarget::Other(_) => Err(UnsupportedTarget::new(target, UnsupportedReason::UnknownCategory)),
    }
}

/// Convert a canonical target into the provider's representation
pub fn to_native(target: CanonicalTarget) -> NativeTarget {
    match target {
        CanonicalTarget::Head => NativeTarget::Head,
        CanonicalTarget::Hand(chirality, slot) => {
            let chirality = match chirality {
                Chirality::Left => NativeChirality::Left,
                Chirality::Right => NativeChirality::Right,
            };
            let location = match slot {
                HandSlot::ThumbTip => NativeHandLocation::ThumbTip,
                HandSlot::IndexFingerTip => NativeHandLocation::IndexFingerTip,
                HandSlot::Wrist => NativeHandLocation::Wrist,
                HandSlot::Palm => NativeHandLocation::Palm,
                HandSlot::AboveHand => NativeHandLocation::AboveHand,
                HandSlot::Joint(joint) => NativeHandLocation::Joint(joint_to_native(joint)),
            };
            NativeTarget::hand(chirality, location)
        }
    }
}

fn joint_to_canonical(joint: SkeletonJoint) -> CanonicalJoint {
    match joint {
        SkeletonJoint::Wrist => CanonicalJoint::Wrist,
        SkeletonJoint::ThumbKnuckle => CanonicalJoint::ThumbKnuckle,
        SkeletonJoint::ThumbIntermediateBase => CanonicalJoint::ThumbIntermediateBase,
        SkeletonJoint::ThumbIntermediateTip => CanonicalJoint::ThumbIntermediateTip,
        SkeletonJoint::ThumbTip => CanonicalJoint::ThumbTip,
        SkeletonJoint::IndexFingerMetacarpal => CanonicalJoint::IndexFingerMetacarpal,
        SkeletonJoint::IndexFingerKnuckle => CanonicalJoint::IndexFingerKnuckle,
        SkeletonJoint::IndexFingerIntermediateBase => CanonicalJoint::IndexFingerIntermediateBase,
        SkeletonJoint::IndexFingerIntermediateTip => CanonicalJoint::IndexFingerIntermediateTip,
        SkeletonJoint::IndexFingerTip => CanonicalJoint::IndexFingerTip,
        SkeletonJoint::MiddleFingerMetacarpal => CanonicalJoint::MiddleFingerMetacarpal,
        SkeletonJoint::MiddleFingerKnuckle => CanonicalJoint::MiddleFingerKnuckle,
        SkeletonJoint::MiddleFingerIntermediateBase => CanonicalJoint::MiddleFingerIntermediateBase,
        SkeletonJoint::MiddleFingerIntermediateTip => CanonicalJoint::MiddleFingerIntermediateTip,
        SkeletonJoint::MiddleFingerTip => CanonicalJoint::MiddleFingerTip,
        SkeletonJoint::RingFingerMetacarpal => CanonicalJoint::RingFingerMetacarpal,
        SkeletonJoint::RingFingerKnuckle => CanonicalJoint::RingFingerKnuckle,
        SkeletonJoint::RingFingerIntermediateBase => CanonicalJoint::RingFingerIntermediateBase,
        SkeletonJoint::RingFingerIntermediateTip => CanonicalJoint::RingFingerIntermediateTip,
        SkeletonJoint::RingFingerTip => CanonicalJoint::RingFingerTip,
        SkeletonJoint::LittleFingerMetacarpal => CanonicalJoint::LittleFingerMetacarpal,
        SkeletonJoint::LittleFingerKnuckle => CanonicalJoint::LittleFingerKnuckle,
        SkeletonJoint::LittleFingerIntermediateBase => CanonicalJoint::LittleFingerIntermediateBase,
        SkeletonJoint::LittleFingerIntermediateTip => CanonicalJoint::LittleFingerIntermediateTip,
        SkeletonJoint::LittleFingerTip => CanonicalJoint::LittleFingerTip,
        SkeletonJoint::ForearmWrist => CanonicalJoint::ForearmWrist,
        SkeletonJoint::ForearmArm => CanonicalJoint::ForearmArm,
    }
}

fn joint_to_native(joint: CanonicalJoint) -> SkeletonJoint {
    match joint {
        CanonicalJoint::Wrist => SkeletonJoint::Wrist,
        CanonicalJoint::ThumbKnuckle => SkeletonJoint::ThumbKnuckle,
        CanonicalJoint::ThumbIntermediateBase => SkeletonJoint::ThumbIntermediateBase,
        CanonicalJoint::ThumbIntermediateTip => SkeletonJoint::ThumbIntermediateTip,
        CanonicalJoint::ThumbTip => SkeletonJoint::ThumbTip,
        CanonicalJoint::IndexFingerMetacarpal => SkeletonJoint::IndexFingerMetacarpal,
        CanonicalJoint::IndexFingerKnuckle => SkeletonJoint::IndexFingerKnuckle,
        CanonicalJoint::IndexFingerIntermediateBase => SkeletonJoint::IndexFingerIntermediateBase,
        CanonicalJoint::IndexFingerIntermediateTip => SkeletonJoint::IndexFingerIntermediateTip,
        CanonicalJoint::IndexFingerTip => SkeletonJoint::IndexFingerTip,
        CanonicalJoint::MiddleFingerMetacarpal => SkeletonJoint::MiddleFingerMetacarpal,
        CanonicalJoint::MiddleFingerKnuckle => SkeletonJoint::MiddleFingerKnuckle,
        CanonicalJoint::MiddleFingerIntermediateBase => SkeletonJoint::MiddleFingerIntermediateBase,
        CanonicalJoint::MiddleFingerIntermediateTip => SkeletonJoint::MiddleFingerIntermediateTip,
        CanonicalJoint::MiddleFingerTip => SkeletonJoint::MiddleFingerTip,
        CanonicalJoint::RingFingerMetacarpal => SkeletonJoint::RingFingerMetacarpal,
        CanonicalJoint::RingFingerKnuckle => SkeletonJoint::RingFingerKnuckle,
        CanonicalJoint::RingFingerIntermediateBase => SkeletonJoint::RingFingerIntermediateBase,
        CanonicalJoint::RingFingerIntermediateTip => SkeletonJoint::RingFingerIntermediateTip,
        CanonicalJoint::RingFingerTip => SkeletonJoint::RingFingerTip,
        CanonicalJoint::LittleFingerMetacarpal => SkeletonJoint::LittleFingerMetacarpal,
        CanonicalJoint::LittleFingerKnuckle => SkeletonJoint::LittleFingerKnuckle,
        CanonicalJoint::LittleFingerIntermediateBase => SkeletonJoint::LittleFingerIntermediateBase,
        CanonicalJoint::LittleFingerIntermediateTip => SkeletonJoint::LittleFingerIntermediateTip,
        CanonicalJoint::LittleFingerTip => SkeletonJoint::LittleFingerTip,
        CanonicalJoint::ForearmWrist => SkeletonJoint::ForearmWrist,
        CanonicalJoint::ForearmArm => SkeletonJoint::ForearmArm,
    }
}

/// Result of converting one provider snapshot
#[derive(Debug, Clone, Default)]
pub struct ConvertedSnapshot {
    pub transforms: BTreeMap<CanonicalTarget, Transform>,
    /// Entries with no canonical slot
    pub dropped: Vec<UnsupportedTarget>,
    /// Canonical targets whose transform had a NaN or infinite component
    pub non_finite: Vec<CanonicalTarget>,
}

impl ConvertedSnapshot {
    /// Number of provider entries left out of `transforms`
    pub fn rejected_count(&self) -> usize {
        self.dropped.len() + self.non_finite.len()
    }
}

/// Convert a whole provider mapping, dropping entries with no canonical slot
///
/// Non-finite transforms are dropped as well; they cannot be persisted.
/// Two native synonyms landing on the same canonical target keep one of
/// the two transforms; which one is unspecified.
pub fn convert_snapshot(transforms: &HashMap<NativeTarget, Transform>) -> ConvertedSnapshot {
    let mut converted = ConvertedSnapshot::default();
    for (native, transform) in transforms {
        match to_canonical(native) {
            Ok(target) if !transform.is_finite() => {
                tracing::warn!("Dropping non-finite transform for {}: {:?}", target, transform);
                converted.non_finite.push(target);
            }
            Ok(target) => {
                converted.transforms.insert(target, *transform);
            }
            Err(err) => {
                tracing::debug!("Dropping provider target: {}", err);
                converted.dropped.push(err);
            }
        }
    }
    converted
}
