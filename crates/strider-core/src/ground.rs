//! Ground-query interface consumed by the locomotion core.
//!
//! The controller never owns terrain. The host supplies an implementation of
//! [`GroundQuery`]; all queries are synchronous and a miss is an `Option`,
//! never an error.

use crate::math::Vec3;

/// Result of a ground raycast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Nearest solid-surface intersection along the ray.
    pub position: Vec3,
}

/// Result of resolving a penetrating point out of solid ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    /// Surface point the penetrating position was corrected to.
    pub position: Vec3,
    /// Correction vector that was applied. Its magnitude is a proxy for
    /// impact speed.
    pub offset: Vec3,
}

/// External capability providing ground sampling and collision resolution.
pub trait GroundQuery {
    /// Nearest solid-surface intersection along a ray, or `None` on a miss.
    ///
    /// `direction` need not be normalized; `max_length` bounds the travel
    /// distance along the normalized direction.
    fn raycast_ground(&self, origin: Vec3, direction: Vec3, max_length: f64) -> Option<RaycastHit>;

    /// Resolve a point that has penetrated solid ground, pushing it back to
    /// the surface against `direction`. Returns `None` when the point is not
    /// colliding.
    fn resolve_collision(&self, position: Vec3, direction: Vec3) -> Option<CollisionHit>;

    /// Whether a point currently rests on a solid surface.
    fn is_on_ground(&self, position: Vec3) -> bool;
}

impl<G: GroundQuery + ?Sized> GroundQuery for &G {
    fn raycast_ground(&self, origin: Vec3, direction: Vec3, max_length: f64) -> Option<RaycastHit> {
        (**self).raycast_ground(origin, direction, max_length)
    }

    fn resolve_collision(&self, position: Vec3, direction: Vec3) -> Option<CollisionHit> {
        (**self).resolve_collision(position, direction)
    }

    fn is_on_ground(&self, position: Vec3) -> bool {
        (**self).is_on_ground(position)
    }
}
