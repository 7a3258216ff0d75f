//! Semantic anchor resolution.
//!
//! Accessories bind to named anchors (`neck`, `forehead`, ...) instead of
//! raw mesh indices, so product data stays readable and the index table
//! lives in exactly one place.

use crate::types::{FaceObservation, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// --- Dense face mesh reference indices ---
const FOREHEAD_LANDMARK: usize = 10; // upper forehead / hairline
const CHIN_LANDMARK: usize = 152; // chin, approximates the neck base in camera view
const NOSE_TIP_LANDMARK: usize = 1;
const LEFT_TEMPLE_LANDMARK: usize = 127; // near the left ear
const RIGHT_TEMPLE_LANDMARK: usize = 356; // near the right ear

/// Chin-pin displacement for finger accessories. The face mesh does not
/// track hands, so rings are pinned below the chin for demo purposes.
const FINGER_DROP: f32 = 12.0;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnchorError {
    #[error("landmark {index} out of range: observation has {available} landmarks")]
    LandmarkOutOfRange { index: usize, available: usize },
}

/// Semantic anchor names understood by the placement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorName {
    Neck,
    Forehead,
    Nose,
    LeftEar,
    RightEar,
    Finger,
}

/// Mesh binding for one anchor: the landmark to follow plus a fixed
/// vertical displacement applied after the y-axis flip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorBinding {
    pub landmark: usize,
    pub vertical_offset: f32,
}

/// An anchor resolved against a concrete observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedAnchor {
    pub point: Vec3,
    pub vertical_offset: f32,
}

impl AnchorName {
    /// Parse an anchor name as found in product feeds. Accepts the
    /// canonical snake_case spellings plus the aliases legacy shop data
    /// uses (`neckBase`, `left-ear`, `head`, `hand`, ...).
    pub fn parse(raw: &str) -> Option<AnchorName> {
        let normalized: String = raw
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "neck" | "neckbase" => Some(AnchorName::Neck),
            "forehead" | "head" => Some(AnchorName::Forehead),
            "nose" | "nosetip" => Some(AnchorName::Nose),
            "leftear" | "earleft" | "lefttemple" => Some(AnchorName::LeftEar),
            "rightear" | "earright" | "righttemple" => Some(AnchorName::RightEar),
            "finger" | "hand" | "ring" => Some(AnchorName::Finger),
            _ => None,
        }
    }

    /// Infer an anchor from a product category, for records that predate
    /// explicit anchor configuration. Unknown categories fall back to the
    /// neck, the safe default for chains and pendants.
    pub fn for_category(category: &str) -> AnchorName {
        let normalized: String = category
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "foreheads" | "forehead" | "maangtikka" => AnchorName::Forehead,
            "earring" | "earrings" | "earringleft" => AnchorName::LeftEar,
            "earringright" => AnchorName::RightEar,
            "nose" | "nosepin" | "nosepins" => AnchorName::Nose,
            "ring" | "rings" | "fingerring" => AnchorName::Finger,
            _ => AnchorName::Neck,
        }
    }

    /// The mesh binding for this anchor.
    pub fn binding(&self) -> AnchorBinding {
        match self {
            AnchorName::Neck => AnchorBinding { landmark: CHIN_LANDMARK, vertical_offset: 0.0 },
            AnchorName::Forehead => {
                AnchorBinding { landmark: FOREHEAD_LANDMARK, vertical_offset: 0.0 }
            }
            AnchorName::Nose => AnchorBinding { landmark: NOSE_TIP_LANDMARK, vertical_offset: 0.0 },
            AnchorName::LeftEar => {
                AnchorBinding { landmark: LEFT_TEMPLE_LANDMARK, vertical_offset: 0.0 }
            }
            AnchorName::RightEar => {
                AnchorBinding { landmark: RIGHT_TEMPLE_LANDMARK, vertical_offset: 0.0 }
            }
            AnchorName::Finger => {
                AnchorBinding { landmark: CHIN_LANDMARK, vertical_offset: FINGER_DROP }
            }
        }
    }

    /// Resolve this anchor against an observation.
    pub fn resolve(&self, face: &FaceObservation) -> Result<ResolvedAnchor, AnchorError> {
        let binding = self.binding();
        let point = face.landmark(binding.landmark).ok_or(AnchorError::LandmarkOutOfRange {
            index: binding.landmark,
            available: face.landmark_count(),
        })?;
        Ok(ResolvedAnchor { point, vertical_offset: binding.vertical_offset })
    }

    /// All anchors, in display order.
    pub const fn all() -> [AnchorName; 6] {
        [
            AnchorName::Neck,
            AnchorName::Forehead,
            AnchorName::Nose,
            AnchorName::LeftEar,
            AnchorName::RightEar,
            AnchorName::Finger,
        ]
    }
}

impl fmt::Display for AnchorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnchorName::Neck => "neck",
            AnchorName::Forehead => "forehead",
            AnchorName::Nose => "nose",
            AnchorName::LeftEar => "left_ear",
            AnchorName::RightEar => "right_ear",
            AnchorName::Finger => "finger",
        };
        f.write_str(name)
    }
}
