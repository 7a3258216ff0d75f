//! Temporal smoothing of placement transforms.
//!
//! Landmark positions jitter by a few pixels even for a motionless
//! subject; an exponential moving average per instance keeps accessories
//! steady without visible lag.

use crate::types::SmoothedTransform;

/// Default blend factor: 0 = frozen, 1 = no smoothing.
pub const DEFAULT_SMOOTHING_ALPHA: f32 = 0.25;

fn lerp(prev: f32, next: f32, alpha: f32) -> f32 {
    prev + (next - prev) * alpha
}

/// Exponential smoother for one accessory instance.
///
/// The first observation after construction (or [`reset`](Self::reset))
/// seeds the filter and passes through unchanged, so a freshly created
/// instance snaps to the face instead of gliding in from the origin.
#[derive(Debug, Clone)]
pub struct TransformSmoother {
    alpha: f32,
    state: Option<SmoothedTransform>,
}

impl TransformSmoother {
    /// Out-of-range or non-finite `alpha` values are replaced with
    /// [`DEFAULT_SMOOTHING_ALPHA`].
    pub fn new(alpha: f32) -> Self {
        let alpha = if alpha > 0.0 && alpha <= 1.0 { alpha } else { DEFAULT_SMOOTHING_ALPHA };
        TransformSmoother { alpha, state: None }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Blend the previous smoothed value toward `target` component-wise.
    pub fn update(&mut self, target: SmoothedTransform) -> SmoothedTransform {
        let smoothed = match self.state {
            None => target,
            Some(prev) => SmoothedTransform {
                x: lerp(prev.x, target.x, self.alpha),
                y: lerp(prev.y, target.y, self.alpha),
                z: lerp(prev.z, target.z, self.alpha),
                scale: lerp(prev.scale, target.scale, self.alpha),
            },
        };
        self.state = Some(smoothed);
        smoothed
    }

    /// Forget the filter state; the next update passes through unchanged.
    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn current(&self) -> Option<SmoothedTransform> {
        self.state
    }
}
