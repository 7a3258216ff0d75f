//! Accessory descriptors, the engine-facing product contract.
//!
//! A descriptor is everything the engine needs to place one accessory:
//! where it binds, how its content is sourced, and its placement tuning.
//! Hosts build descriptors however they like (the catalog crate derives
//! them from shop records); the engine only ever sees this type.

use crate::anchor::AnchorName;
use crate::geometry::ShapeKind;
use crate::smoothing::DEFAULT_SMOOTHING_ALPHA;
use crate::types::Vec3;
use serde::{Deserialize, Serialize};

/// Default face-width multiplier when a product does not specify one.
pub const DEFAULT_BASE_SCALE: f32 = 0.02;

/// How accessory content is sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// Built from the parametric shape catalog; never needs a fetch.
    Procedural,
    /// A flat texture, billboarded by the renderer.
    Image,
    /// A glTF document fetched from `asset_url`.
    #[serde(alias = "gltf")]
    Mesh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessoryDescriptor {
    /// Stable identifier, surfaced in logs and status.
    pub id: String,
    pub anchor: AnchorName,
    pub kind: AssetKind,
    /// Source location for `Image` and `Mesh` content.
    #[serde(default)]
    pub asset_url: Option<String>,
    /// Stand-in shape hint; also the primary content for `Procedural`.
    #[serde(default)]
    pub shape: Option<ShapeKind>,
    /// Stand-in metal color as a `#rrggbb` hex string.
    #[serde(default)]
    pub color: Option<String>,
    /// Offset from the anchor point, in landmark units.
    #[serde(default)]
    pub offset: Vec3,
    /// Accessory size per unit of face width.
    #[serde(default = "default_base_scale")]
    pub base_scale: f32,
    /// Per-product smoothing override in (0, 1].
    #[serde(default = "default_smoothing_alpha")]
    pub smoothing_alpha: f32,
}

fn default_base_scale() -> f32 {
    DEFAULT_BASE_SCALE
}

fn default_smoothing_alpha() -> f32 {
    DEFAULT_SMOOTHING_ALPHA
}

impl AccessoryDescriptor {
    /// A procedural accessory with default tuning.
    pub fn procedural(id: impl Into<String>, anchor: AnchorName) -> Self {
        AccessoryDescriptor {
            id: id.into(),
            anchor,
            kind: AssetKind::Procedural,
            asset_url: None,
            shape: None,
            color: None,
            offset: Vec3::ZERO,
            base_scale: DEFAULT_BASE_SCALE,
            smoothing_alpha: DEFAULT_SMOOTHING_ALPHA,
        }
    }

    /// Normalise untrusted tuning values. Non-finite or out-of-range
    /// numbers are replaced with defaults rather than rejected, matching
    /// how lenient product feeds are in practice.
    pub fn sanitized(mut self) -> Self {
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            self.smoothing_alpha = DEFAULT_SMOOTHING_ALPHA;
        }
        if !(self.base_scale.is_finite() && self.base_scale > 0.0) {
            self.base_scale = DEFAULT_BASE_SCALE;
        }
        if !self.offset.is_finite() {
            self.offset = Vec3::ZERO;
        }
        if self.asset_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            self.asset_url = None;
        }
        self
    }
}
