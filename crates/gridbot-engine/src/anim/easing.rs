// Pure easing math for transition interpolation. No scene dependencies.

use glam::Vec2;
use std::f32::consts::PI;

/// Easing function applied to a transition's normalized progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant velocity.
    #[default]
    Linear,
    /// Slow end — the feel of a tile glide settling onto its cell.
    QuadOut,
    /// Slow start and end.
    QuadInOut,
    /// Smooth sine ramp in and out.
    SineInOut,
}

impl Easing {
    /// Apply to a normalized time value `t` in [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
        }
    }
}

/// Linear interpolation between two scalars.
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Eased interpolation between two points.
#[inline]
pub fn ease_vec2(from: Vec2, to: Vec2, t: f32, easing: Easing) -> Vec2 {
    let e = easing.apply(t);
    Vec2::new(lerp(from.x, to.x, e), lerp(from.y, to.y, e))
}
