//! Split-distance hysteresis zones.

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

/// A cylindrical tolerance region with independent horizontal and vertical
/// bounds.
///
/// Lateral slack and vertical slack mean different things for a planted foot,
/// so the region is a cylinder rather than a sphere: a point is inside when
/// its planar (XZ) distance from the center is within `horizontal` and its
/// height difference is within `vertical`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitDistance {
    /// Planar (XZ) radius.
    pub horizontal: f64,
    /// Half-height of the cylinder above and below the center.
    pub vertical: f64,
}

impl SplitDistance {
    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Whether `point` lies inside the cylinder centered at `center`.
    pub fn contains(&self, center: &Vec3, point: &Vec3) -> bool {
        let planar = (point.x - center.x).hypot(point.z - center.z);
        planar <= self.horizontal && (point.y - center.y).abs() <= self.vertical
    }

    /// Interpolate both bounds independently toward `other` by `t` in [0, 1].
    ///
    /// Used to widen the trigger zone with walking speed.
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            horizontal: self.horizontal + (other.horizontal - self.horizontal) * t,
            vertical: self.vertical + (other.vertical - self.vertical) * t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn contains_inside_cylinder() {
        let zone = SplitDistance::new(1.0, 0.5);
        let center = Vec3::new(0.0, 0.0, 0.0);
        assert!(zone.contains(&center, &Vec3::new(0.5, 0.2, 0.5)));
    }

    #[test]
    fn rejects_horizontal_excess_even_when_vertical_ok() {
        let zone = SplitDistance::new(1.0, 10.0);
        let center = Vec3::new(0.0, 0.0, 0.0);
        assert!(!zone.contains(&center, &Vec3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn rejects_vertical_excess_even_when_horizontal_ok() {
        let zone = SplitDistance::new(10.0, 0.5);
        let center = Vec3::new(0.0, 0.0, 0.0);
        assert!(!zone.contains(&center, &Vec3::new(0.0, 1.0, 0.0)));
    }

    #[test]
    fn contains_is_rotation_invariant_about_vertical_axis() {
        let zone = SplitDistance::new(1.0, 0.5);
        let center = Vec3::new(2.0, 1.0, -3.0);
        let point = Vec3::new(2.7, 1.3, -3.4);
        let inside = zone.contains(&center, &point);

        for i in 1..16 {
            let angle = i as f64 * std::f64::consts::TAU / 16.0;
            let mut rotated = point;
            crate::math::rotate_y_about(&mut rotated, angle, &center);
            assert_eq!(zone.contains(&center, &rotated), inside, "angle {angle}");
        }
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = SplitDistance::new(0.2, 0.4);
        let b = SplitDistance::new(1.0, 0.8);
        assert_relative_eq!(a.lerp(&b, 0.0).horizontal, 0.2);
        assert_relative_eq!(a.lerp(&b, 1.0).vertical, 0.8);
        let mid = a.lerp(&b, 0.5);
        assert_relative_eq!(mid.horizontal, 0.6);
        assert_relative_eq!(mid.vertical, 0.6, epsilon = 1e-12);
    }
}
