//! Canonical target vocabulary
//!
//! This is the persisted identifier space. Tags are part of the file format:
//! variants may be added, but an existing tag must never change.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Hand chirality in the canonical space (no "either")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chirality {
    Left,
    Right,
}

impl Chirality {
    pub const ALL: [Chirality; 2] = [Chirality::Left, Chirality::Right];

    pub fn name(&self) -> &'static str {
        match self {
            Chirality::Left => "left",
            Chirality::Right => "right",
        }
    }
}

/// The 27 hand skeleton joints that have a canonical slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalJoint {
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

impl CanonicalJoint {
    pub const ALL: [CanonicalJoint; 27] = [
        CanonicalJoint::Wrist,
        CanonicalJoint::ThumbKnuckle,
        CanonicalJoint::ThumbIntermediateBase,
        CanonicalJoint::ThumbIntermediateTip,
        CanonicalJoint::ThumbTip,
        CanonicalJoint::IndexFingerMetacarpal,
        CanonicalJoint::IndexFingerKnuckle,
        CanonicalJoint::IndexFingerIntermediateBase,
        CanonicalJoint::IndexFingerIntermediateTip,
        CanonicalJoint::IndexFingerTip,
        CanonicalJoint::MiddleFingerMetacarpal,
        CanonicalJoint::MiddleFingerKnuckle,
        CanonicalJoint::MiddleFingerIntermediateBase,
        CanonicalJoint::MiddleFingerIntermediateTip,
        CanonicalJoint::MiddleFingerTip,
        CanonicalJoint::RingFingerMetacarpal,
        CanonicalJoint::RingFingerKnuckle,
        CanonicalJoint::RingFingerIntermediateBase,
        CanonicalJoint::RingFingerIntermediateTip,
        CanonicalJoint::RingFingerTip,
        CanonicalJoint::LittleFingerMetacarpal,
        CanonicalJoint::LittleFingerKnuckle,
        CanonicalJoint::LittleFingerIntermediateBase,
        CanonicalJoint::LittleFingerIntermediateTip,
        CanonicalJoint::LittleFingerTip,
        CanonicalJoint::ForearmWrist,
        CanonicalJoint::ForearmArm,
    ];

    /// Stable name used inside the persisted tag
    pub fn name(&self) -> &'static str {
        match self {
            CanonicalJoint::Wrist => "wrist",
            CanonicalJoint::ThumbKnuckle => "thumbKnuckle",
            CanonicalJoint::ThumbIntermediateBase => "thumbIntermediateBase",
            CanonicalJoint::ThumbIntermediateTip => "thumbIntermediateTip",
            CanonicalJoint::ThumbTip => "thumbTip",
            CanonicalJoint::IndexFingerMetacarpal => "indexFingerMetacarpal",
            CanonicalJoint::IndexFingerKnuckle => "indexFingerKnuckle",
            CanonicalJoint::IndexFingerIntermediateBase => "indexFingerIntermediateBase",
            CanonicalJoint::IndexFingerIntermediateTip => "indexFingerIntermediateTip",
            CanonicalJoint::IndexFingerTip => "indexFingerTip",
            CanonicalJoint::MiddleFingerMetacarpal => "middleFingerMetacarpal",
            CanonicalJoint::MiddleFingerKnuckle => "middleFingerKnuckle",
            CanonicalJoint::MiddleFingerIntermediateBase => "middleFingerIntermediateBase",
            CanonicalJoint::MiddleFingerIntermediateTip => "middleFingerIntermediateTip",
            CanonicalJoint::MiddleFingerTip => "middleFingerTip",
            CanonicalJoint::RingFingerMetacarpal => "ringFingerMetacarpal",
            CanonicalJoint::RingFingerKnuckle => "ringFingerKnuckle",
            CanonicalJoint::RingFingerIntermediateBase => "ringFingerIntermediateBase",
            CanonicalJoint::RingFingerIntermediateTip => "ringFingerIntermediateTip",
            CanonicalJoint::RingFingerTip => "ringFingerTip",
            CanonicalJoint::LittleFingerMetacarpal => "littleFingerMetacarpal",
            CanonicalJoint::LittleFingerKnuckle => "littleFingerKnuckle",
            CanonicalJoint::LittleFingerIntermediateBase => "littleFingerIntermediateBase",
            CanonicalJoint::LittleFingerIntermediateTip => "littleFingerIntermediateTip",
            CanonicalJoint::LittleFingerTip => "littleFingerTip",
            CanonicalJoint::ForearmWrist => "forearmWrist",
            CanonicalJoint::ForearmArm => "forearmArm",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|j| j.name() == name)
    }
}

/// A location on one hand: either a named point or a skeleton joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandSlot {
    ThumbTip,
    IndexFingerTip,
    Wrist,
    Palm,
    AboveHand,
    Joint(CanonicalJoint),
}

impl HandSlot {
    /// Named locations (everything except joints)
    pub const LOCATIONS: [HandSlot; 5] = [
        HandSlot::ThumbTip,
        HandSlot::IndexFingerTip,
        HandSlot::Wrist,
        HandSlot::Palm,
        HandSlot::AboveHand,
    ];

    /// All 32 slots of one hand
    pub fn all() -> impl Iterator<Item = HandSlot> {
        Self::LOCATIONS
            .into_iter()
            .chain(CanonicalJoint::ALL.into_iter().map(HandSlot::Joint))
    }

    fn write_tag(&self, out: &mut String) {
        match self {
            HandSlot::ThumbTip => out.push_str("thumbTip"),
            HandSlot::IndexFingerTip => out.push_str("indexFingerTip"),
            HandSlot::Wrist => out.push_str("wrist"),
            HandSlot::Palm => out.push_str("palm"),
            HandSlot::AboveHand => out.push_str("aboveHand"),
            HandSlot::Joint(joint) => {
                out.push_str(JOINT_PREFIX);
                out.push_str(joint.name());
            }
        }
    }

    fn parse(tag: &str) -> Option<Self> {
        if let Some(joint) = tag.strip_prefix(JOINT_PREFIX) {
            return CanonicalJoint::from_name(joint).map(HandSlot::Joint);
        }
        match tag {
            "thumbTip" => Some(HandSlot::ThumbTip),
            "indexFingerTip" => Some(HandSlot::IndexFingerTip),
            "wrist" => Some(HandSlot::Wrist),
            "palm" => Some(HandSlot::Palm),
            "aboveHand" => Some(HandSlot::AboveHand),
            _ => None,
        }
    }
}

const HEAD_TAG: &str = "head";
const HAND_PREFIX: &str = "hand_";
const JOINT_PREFIX: &str = "joint_for_";

/// Number of canonical targets: head plus 32 slots per hand
pub const CANONICAL_TARGET_COUNT: usize = 1 + 2 * (HandSlot::LOCATIONS.len() + CanonicalJoint::ALL.len());

/// Stable, serializable identifier of a recorded target
///
/// Serialized as its string tag, e.g. `head`, `hand_left_palm` or
/// `hand_right_joint_for_middleFingerTip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalTarget {
    Head,
    Hand(Chirality, HandSlot),
}

impl CanonicalTarget {
    /// Iterate over every canonical target
    pub fn all() -> impl Iterator<Item = CanonicalTarget> {
        std::iter::once(CanonicalTarget::Head).chain(
            Chirality::ALL
                .into_iter()
                .flat_map(|c| HandSlot::all().map(move |s| CanonicalTarget::Hand(c, s))),
        )
    }

    /// The persisted tag of this target
    pub fn tag(&self) -> String {
        match self {
            CanonicalTarget::Head => HEAD_TAG.to_string(),
            CanonicalTarget::Hand(chirality, slot) => {
                let mut tag = String::with_capacity(48);
                tag.push_str(HAND_PREFIX);
                tag.push_str(chirality.name());
                tag.push('_');
                slot.write_tag(&mut tag);
                tag
            }
        }
    }

    /// Parse a persisted tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        if tag == HEAD_TAG {
            return Some(CanonicalTarget::Head);
        }
        let rest = tag.strip_prefix(HAND_PREFIX)?;
        let (chirality, slot) = if let Some(slot) = rest.strip_prefix("left_") {
            (Chirality::Left, slot)
        } else if let Some(slot) = rest.strip_prefix("right_") {
            (Chirality::Right, slot)
        } else {
            return None;
        };
        HandSlot::parse(slot).map(|s| CanonicalTarget::Hand(chirality, s))
    }

    pub fn chirality(&self) -> Option<Chirality> {
        match self {
            CanonicalTarget::Head => None,
            CanonicalTarget::Hand(c, _) => Some(*c),
        }
    }
}

impl fmt::Display for CanonicalTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for CanonicalTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s).ok_or_else(|| format!("unknown canonical target tag `{}`", s))
    }
}

impl Serialize for CanonicalTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.tag())
    }
}

impl<'de> Deserialize<'de> for CanonicalTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}
