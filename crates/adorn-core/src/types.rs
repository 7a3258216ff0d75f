use serde::{Deserialize, Serialize};

/// Landmark count of the dense face mesh the engine is calibrated for.
pub const MESH_LANDMARK_COUNT: usize = 468;

/// A point or offset in landmark space (source-frame pixels, z toward camera).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Vec3::ZERO
    }
}

/// One detected face: a dense landmark mesh in source-frame coordinates.
///
/// Observations carry no cross-frame identity; the engine pairs them with
/// accessory instances purely by list position.
#[derive(Debug, Clone, Default)]
pub struct FaceObservation {
    pub landmarks: Vec<Vec3>,
}

impl FaceObservation {
    pub fn new(landmarks: Vec<Vec3>) -> Self {
        FaceObservation { landmarks }
    }

    /// Landmark by mesh index, `None` when the observation is too short.
    pub fn landmark(&self, index: usize) -> Option<Vec3> {
        self.landmarks.get(index).copied()
    }

    pub fn landmark_count(&self) -> usize {
        self.landmarks.len()
    }
}

/// The placement channels that are temporally smoothed.
///
/// Position is in render-scene coordinates (y and z already sign-adjusted
/// from landmark space); `scale` is the uniform node scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedTransform {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub scale: f32,
}
