//! Math aliases and small vector helpers shared across the workspace.
//!
//! Coordinates are Y-up: the XZ plane is horizontal, Y is vertical.

use nalgebra::{Vector2, Vector3};

/// World-space vector, `f64` throughout the controller.
pub type Vec3 = Vector3<f64>;
/// Horizontal-plane (XZ) vector.
pub type Vec2 = Vector2<f64>;

/// Unit vector pointing straight down.
pub const DOWN: Vec3 = Vec3::new(0.0, -1.0, 0.0);
/// Reference heading used as the rest orientation of chain segments.
pub const FORWARD: Vec3 = Vec3::new(0.0, 0.0, 1.0);

/// Planar (XZ) distance between two points.
pub fn horizontal_distance(a: &Vec3, b: &Vec3) -> f64 {
    (a.x - b.x).hypot(a.z - b.z)
}

/// Project a point onto the horizontal plane.
pub fn to_planar(v: &Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

/// Advance `from` toward `to` by at most `step` (constant-speed, not
/// exponential decay). Arrives exactly when within one step.
pub fn move_towards(from: &mut Vec3, to: &Vec3, step: f64) {
    let delta = to - *from;
    let dist = delta.norm();
    if dist <= step || dist < f64::EPSILON {
        *from = *to;
    } else {
        *from += delta * (step / dist);
    }
}

/// Scalar counterpart of [`move_towards`].
pub fn move_towards_scalar(from: f64, to: f64, step: f64) -> f64 {
    let delta = to - from;
    if delta.abs() <= step {
        to
    } else {
        from + step * delta.signum()
    }
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Rotate `point` about the vertical axis through `pivot` by `angle` radians.
pub fn rotate_y_about(point: &mut Vec3, angle: f64, pivot: &Vec3) {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - pivot.x;
    let dz = point.z - pivot.z;
    point.x = pivot.x + dx * cos + dz * sin;
    point.z = pivot.z - dx * sin + dz * cos;
}

/// Arithmetic mean of a set of points. Returns the origin for an empty set.
pub fn average(points: impl IntoIterator<Item = Vec3>) -> Vec3 {
    let mut sum = Vec3::zeros();
    let mut count = 0usize;
    for p in points {
        sum += p;
        count += 1;
    }
    if count == 0 {
        Vec3::zeros()
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn move_towards_arrives_exactly() {
        let mut p = Vec3::new(0.0, 0.0, 0.0);
        let target = Vec3::new(0.3, 0.0, 0.0);
        move_towards(&mut p, &target, 0.5);
        assert_relative_eq!(p, target);
    }

    #[test]
    fn move_towards_constant_step() {
        let mut p = Vec3::new(0.0, 0.0, 0.0);
        let target = Vec3::new(10.0, 0.0, 0.0);
        move_towards(&mut p, &target, 0.5);
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-12);
        move_towards(&mut p, &target, 0.5);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn move_towards_scalar_overshoot_clamps() {
        assert_relative_eq!(move_towards_scalar(1.0, 1.2, 0.5), 1.2);
        assert_relative_eq!(move_towards_scalar(1.0, -1.0, 0.5), 0.5);
    }

    #[test]
    fn rotate_y_about_quarter_turn() {
        let pivot = Vec3::new(1.0, 0.0, 1.0);
        let mut p = Vec3::new(2.0, 5.0, 1.0);
        rotate_y_about(&mut p, std::f64::consts::FRAC_PI_2, &pivot);
        assert_relative_eq!(p.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p.z, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn average_of_points() {
        let pts = [Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 2.0, 0.0)];
        let avg = average(pts);
        assert_relative_eq!(avg, Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn average_empty_is_origin() {
        assert_relative_eq!(average(std::iter::empty()), Vec3::zeros());
    }
}
