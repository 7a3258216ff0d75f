//! Target transform computation.
//!
//! Converts a resolved anchor plus descriptor tuning into the channels
//! that get smoothed. Landmark y grows downward and the render scene's y
//! grows upward, hence the sign flip; accessory size is normalised by the
//! subject's on-screen face width so it tracks distance from the camera.

use crate::anchor::{AnchorError, ResolvedAnchor};
use crate::descriptor::AccessoryDescriptor;
use crate::scene::NodePlacement;
use crate::types::{FaceObservation, SmoothedTransform, Vec3};

// --- Face-width landmarks (outer cheeks) ---
pub const LEFT_CHEEK_LANDMARK: usize = 234;
pub const RIGHT_CHEEK_LANDMARK: usize = 454;

/// Depth bias placing accessories at the render camera's focal plane:
/// half the reference 480 px feed height over tan of half the 45° FOV.
pub const DEFAULT_CAMERA_DEPTH_BIAS: f32 = 579.4;

/// Accessories face the camera; the mesh's front looks down +z.
pub const ACCESSORY_ROTATION: Vec3 = Vec3::new(0.0, std::f32::consts::PI, 0.0);

/// Scene-level placement tuning shared by every accessory.
#[derive(Debug, Clone, Copy)]
pub struct PlacementConfig {
    pub camera_depth_bias: f32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        PlacementConfig { camera_depth_bias: DEFAULT_CAMERA_DEPTH_BIAS }
    }
}

/// On-screen face width: distance between the outer cheek landmarks.
pub fn face_width(face: &FaceObservation) -> Result<f32, AnchorError> {
    let left = face.landmark(LEFT_CHEEK_LANDMARK).ok_or(AnchorError::LandmarkOutOfRange {
        index: LEFT_CHEEK_LANDMARK,
        available: face.landmark_count(),
    })?;
    let right = face.landmark(RIGHT_CHEEK_LANDMARK).ok_or(AnchorError::LandmarkOutOfRange {
        index: RIGHT_CHEEK_LANDMARK,
        available: face.landmark_count(),
    })?;
    Ok(left.distance(&right))
}

/// Raw (pre-smoothing) placement for one face.
pub fn compute_target(
    face: &FaceObservation,
    anchor: &ResolvedAnchor,
    descriptor: &AccessoryDescriptor,
    config: &PlacementConfig,
) -> Result<SmoothedTransform, AnchorError> {
    let width = face_width(face)?;
    Ok(SmoothedTransform {
        x: anchor.point.x + descriptor.offset.x,
        y: -anchor.point.y - descriptor.offset.y - anchor.vertical_offset,
        z: config.camera_depth_bias + anchor.point.z + descriptor.offset.z,
        scale: width * descriptor.base_scale,
    })
}

/// Expand smoothed channels into a full node placement.
pub fn node_placement(transform: &SmoothedTransform) -> NodePlacement {
    NodePlacement {
        position: Vec3::new(transform.x, transform.y, transform.z),
        rotation: ACCESSORY_ROTATION,
        scale: transform.scale,
    }
}
