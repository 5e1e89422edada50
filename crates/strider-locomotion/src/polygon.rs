//! Horizontal support-polygon tests.
//!
//! Grounded feet projected to the XZ plane in a fixed winding order form the
//! support polygon. The body is statically stable iff its centre of mass
//! projects inside it.

use strider_core::math::Vec2;

/// Even-odd ray-crossing point-in-polygon test.
///
/// Degenerate polygons (fewer than 3 vertices) contain nothing.
pub fn point_in_polygon(point: &Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let a = polygon[i];
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let t = (point.y - a.y) / (b.y - a.y);
            if point.x < a.x + t * (b.x - a.x) {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Nearest point on the polygon's boundary to `point`.
///
/// For a single vertex this is the vertex; for two vertices, the nearest
/// point on the segment between them.
pub fn nearest_point_on_polygon(point: &Vec2, polygon: &[Vec2]) -> Vec2 {
    debug_assert!(!polygon.is_empty());
    if polygon.len() == 1 {
        return polygon[0];
    }

    let mut best = polygon[0];
    let mut best_dist = f64::INFINITY;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let candidate = nearest_point_on_segment(point, &polygon[j], &polygon[i]);
        let dist = (candidate - point).norm_squared();
        if dist < best_dist {
            best_dist = dist;
            best = candidate;
        }
        j = i;
    }
    best
}

fn nearest_point_on_segment(point: &Vec2, a: &Vec2, b: &Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < 1e-12 {
        return *a;
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Vec<Vec2> {
        vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ]
    }

    #[test]
    fn centre_of_square_is_inside() {
        assert!(point_in_polygon(&Vec2::new(0.5, 0.5), &unit_square()));
    }

    #[test]
    fn point_outside_square() {
        assert!(!point_in_polygon(&Vec2::new(1.5, 0.5), &unit_square()));
        assert!(!point_in_polygon(&Vec2::new(0.5, -0.1), &unit_square()));
    }

    #[test]
    fn degenerate_polygon_contains_nothing() {
        let segment = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0)];
        assert!(!point_in_polygon(&Vec2::new(0.5, 0.0), &segment));
    }

    #[test]
    fn triangle_inside_and_outside() {
        let tri = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(2.0, 0.0),
            Vec2::new(1.0, 2.0),
        ];
        assert!(point_in_polygon(&Vec2::new(1.0, 0.5), &tri));
        assert!(!point_in_polygon(&Vec2::new(0.1, 1.5), &tri));
    }

    #[test]
    fn nearest_point_on_square_edge() {
        let nearest = nearest_point_on_polygon(&Vec2::new(1.5, 0.5), &unit_square());
        assert_relative_eq!(nearest, Vec2::new(1.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn nearest_point_clamps_to_corner() {
        let nearest = nearest_point_on_polygon(&Vec2::new(2.0, 2.0), &unit_square());
        assert_relative_eq!(nearest, Vec2::new(1.0, 1.0), epsilon = 1e-12);
    }

    #[test]
    fn nearest_point_on_two_vertex_polygon() {
        let segment = vec![Vec2::new(0.0, 0.0), Vec2::new(2.0, 0.0)];
        let nearest = nearest_point_on_polygon(&Vec2::new(1.0, 1.0), &segment);
        assert_relative_eq!(nearest, Vec2::new(1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn nearest_point_on_single_vertex() {
        let vertex = vec![Vec2::new(3.0, -1.0)];
        let nearest = nearest_point_on_polygon(&Vec2::new(0.0, 0.0), &vertex);
        assert_relative_eq!(nearest, Vec2::new(3.0, -1.0));
    }
}
