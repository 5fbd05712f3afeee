//! Provider-native target identifiers
//!
//! Mirrors the anchoring targets a spatial tracking provider exposes. The
//! space is open-ended: newer providers may report categories or hand
//! locations this crate does not know, which arrive as `Other`.

use std::fmt;

/// Chirality as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeChirality {
    Left,
    Right,
    /// Whichever hand is tracked; has no canonical representative
    Either,
}

/// Joint names of the provider's hand skeleton
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkeletonJoint {
    Wrist,
    ThumbKnuckle,
    ThumbIntermediateBase,
    ThumbIntermediateTip,
    ThumbTip,
    IndexFingerMetacarpal,
    IndexFingerKnuckle,
    IndexFingerIntermediateBase,
    IndexFingerIntermediateTip,
    IndexFingerTip,
    MiddleFingerMetacarpal,
    MiddleFingerKnuckle,
    MiddleFingerIntermediateBase,
    MiddleFingerIntermediateTip,
    MiddleFingerTip,
    RingFingerMetacarpal,
    RingFingerKnuckle,
    RingFingerIntermediateBase,
    RingFingerIntermediateTip,
    RingFingerTip,
    LittleFingerMetacarpal,
    LittleFingerKnuckle,
    LittleFingerIntermediateBase,
    LittleFingerIntermediateTip,
    LittleFingerTip,
    ForearmWrist,
    ForearmArm,
}

impl SkeletonJoint {
    pub const ALL: [SkeletonJoint; 27] = [
        SkeletonJoint::Wrist,
        SkeletonJoint::ThumbKnuckle,
        SkeletonJoint::ThumbIntermediateBase,
        SkeletonJoint::ThumbIntermediateTip,
        SkeletonJoint::ThumbTip,
        SkeletonJoint::IndexFingerMetacarpal,
        SkeletonJoint::IndexFingerKnuckle,
        SkeletonJoint::IndexFingerIntermediateBase,
        SkeletonJoint::IndexFingerIntermediateTip,
        SkeletonJoint::IndexFingerTip,
        SkeletonJoint::MiddleFingerMetacarpal,
        SkeletonJoint::MiddleFingerKnuckle,
        SkeletonJoint::MiddleFingerIntermediateBase,
        SkeletonJoint::MiddleFingerIntermediateTip,
        SkeletonJoint::MiddleFingerTip,
        SkeletonJoint::RingFingerMetacarpal,
        SkeletonJoint::RingFingerKnuckle,
        SkeletonJoint::RingFingerIntermediateBase,
        SkeletonJoint::RingFingerIntermediateTip,
        SkeletonJoint::RingFingerTip,
        SkeletonJoint::LittleFingerMetacarpal,
        SkeletonJoint::LittleFingerKnuckle,
        SkeletonJoint::LittleFingerIntermediateBase,
        SkeletonJoint::LittleFingerIntermediateTip,
        SkeletonJoint::LittleFingerTip,
        SkeletonJoint::ForearmWrist,
        SkeletonJoint::ForearmArm,
    ];
}

/// A location on a tracked hand
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeHandLocation {
    ThumbTip,
    IndexFingerTip,
    Wrist,
    Palm,
    AboveHand,
    Joint(SkeletonJoint),
    /// A location introduced by a newer provider
    Other(String),
}

/// Plane alignment filter of a plane anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaneAlignment {
    Horizontal,
    Vertical,
    Any,
}

/// Anchoring target as the tracking provider identifies it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NativeTarget {
    /// Head anchor
    Head,
    /// Device anchor, reported in place of the head when the head anchor
    /// does not update
    Device,
    Hand {
        chirality: NativeChirality,
        location: NativeHandLocation,
    },
    World,
    Plane { alignment: PlaneAlignment },
    Image { group: String, name: String },
    ReferenceImage { name: String },
    ReferenceObject { name: String },
    /// A category introduced by a newer provider
    Other(String),
}

impl NativeTarget {
    /// Shorthand for a hand target
    pub fn hand(chirality: NativeChirality, location: NativeHandLocation) -> Self {
        NativeTarget::Hand {
            chirality,
            location,
        }
    }

    /// Shorthand for a hand skeleton joint
    pub fn joint(chirality: NativeChirality, joint: SkeletonJoint) -> Self {
        Self::hand(chirality, NativeHandLocation::Joint(joint))
    }
}

impl fmt::Display for NativeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeTarget::Head => write!(f, "head"),
            NativeTarget::Device => write!(f, "device"),
            NativeTarget::Hand {
                chirality,
                location,
            } => write!(f, "hand({:?}, {:?})", chirality, location),
            NativeTarget::World => write!(f, "world"),
            NativeTarget::Plane { alignment } => write!(f, "plane({:?})", alignment),
            NativeTarget::Image { group, name } => write!(f, "image({}/{})", group, name),
            NativeTarget::ReferenceImage { name } => write!(f, "referenceImage({})", name),
            NativeTarget::ReferenceObject { name } => write!(f, "referenceObject({})", name),
            NativeTarget::Other(kind) => write!(f, "other({})", kind),
        }
    }
}
