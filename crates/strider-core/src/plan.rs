//! Static body and leg plans.
//!
//! A plan describes a creature's morphology: where each leg attaches, where
//! its foot rests, and the rigid segments of its kinematic chain. Plans are
//! fixed at creature creation; per-tick state lives in the locomotion crate.
//!
//! Leg ordering convention: legs are stored in left/right pairs from front to
//! back. Even indices are left legs, odd indices are right legs.

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::math::Vec3;

/// One rigid segment of a leg's kinematic chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentPlan {
    /// Segment length, must be positive.
    pub length: f64,
    /// Rest direction of the segment in body space, used to pre-pose the
    /// chain before solving.
    pub direction: Vec3,
}

impl SegmentPlan {
    pub fn new(length: f64, direction: Vec3) -> Self {
        Self { length, direction }
    }
}

/// Static description of a single leg slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegPlan {
    /// Where the chain root attaches, relative to the body center.
    pub attachment: Vec3,
    /// Preferred foot position relative to the body center, at body level
    /// (the controller lowers it by the configured body height).
    pub rest: Vec3,
    /// Chain segments from attachment to foot.
    pub segments: Vec<SegmentPlan>,
}

impl LegPlan {
    pub fn new(attachment: Vec3, rest: Vec3, segments: Vec<SegmentPlan>) -> Self {
        Self {
            attachment,
            rest,
            segments,
        }
    }

    /// Total reach of the leg's chain.
    pub fn max_reach(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    /// Build a two-segment leg whose segments angle up and then down along
    /// the outward rest direction, spider fashion.
    pub fn symmetric(attachment: Vec3, rest: Vec3, segment_length: f64) -> Self {
        let mut outward = rest - attachment;
        outward.y = 0.0;
        let outward = outward
            .try_normalize(1e-9)
            .unwrap_or_else(|| Vec3::new(1.0, 0.0, 0.0));
        let up = Vec3::new(0.0, 1.0, 0.0);
        let upper = (outward + up).normalize();
        let lower = (outward - up).normalize();
        Self::new(
            attachment,
            rest,
            vec![
                SegmentPlan::new(segment_length, upper),
                SegmentPlan::new(segment_length, lower),
            ],
        )
    }
}

/// Static description of a whole creature body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyPlan {
    /// Leg slots in pair order (see module docs).
    pub legs: Vec<LegPlan>,
    /// Pre-pose chains toward a natural outward posture before solving.
    pub straighten_legs: bool,
    /// Pitch applied to the straighten direction, radians off horizontal.
    pub straighten_rotation: f64,
}

impl BodyPlan {
    pub fn new(legs: Vec<LegPlan>) -> Self {
        Self {
            legs,
            straighten_legs: true,
            straighten_rotation: -30f64.to_radians(),
        }
    }

    pub fn with_straighten(mut self, rotation: f64) -> Self {
        self.straighten_legs = true;
        self.straighten_rotation = rotation;
        self
    }

    pub fn without_straighten(mut self) -> Self {
        self.straighten_legs = false;
        self
    }

    /// Validate the plan. Returns `Err` on an unusable morphology.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.legs.is_empty() {
            return Err(PlanError::NoLegs);
        }
        for (leg, plan) in self.legs.iter().enumerate() {
            if plan.segments.is_empty() {
                return Err(PlanError::NoSegments { leg });
            }
            for (segment, seg) in plan.segments.iter().enumerate() {
                if seg.length <= 0.0 {
                    return Err(PlanError::NonPositiveSegmentLength {
                        leg,
                        segment,
                        length: seg.length,
                    });
                }
            }
        }
        Ok(())
    }

    /// Leg indices in support-polygon winding order: left side front to back,
    /// then right side back to front. Grounded feet taken in this order form
    /// a simple (non-self-intersecting) polygon.
    pub fn polygon_order(&self) -> Vec<usize> {
        let n = self.legs.len();
        let mut order: Vec<usize> = (0..n).step_by(2).collect();
        order.extend((1..n).step_by(2).rev());
        order
    }

    /// Fixed leg traversal order for per-tick updates. Deterministic so that
    /// move-gating policies see a reproducible sequence.
    pub fn update_order(&self) -> Vec<usize> {
        (0..self.legs.len()).collect()
    }

    /// A four-legged plan with spider proportions.
    pub fn quadruped() -> Self {
        let mut legs = Vec::with_capacity(4);
        for &z in &[0.4, -0.4] {
            for &side in &[1.0, -1.0] {
                legs.push(LegPlan::symmetric(
                    Vec3::new(0.25 * side, 0.0, z),
                    Vec3::new(1.0 * side, 0.0, z * 2.0),
                    0.9,
                ));
            }
        }
        Self::new(legs)
    }

    /// A six-legged plan with a wider middle stance.
    pub fn hexapod() -> Self {
        let mut legs = Vec::with_capacity(6);
        for &(z, reach) in &[(0.6, 1.0), (0.0, 1.2), (-0.6, 1.0)] {
            for &side in &[1.0, -1.0] {
                legs.push(LegPlan::symmetric(
                    Vec3::new(0.25 * side, 0.0, z),
                    Vec3::new(reach * side, 0.0, z * 1.6),
                    0.9,
                ));
            }
        }
        Self::new(legs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn quadruped_plan_is_valid() {
        let plan = BodyPlan::quadruped();
        assert_eq!(plan.legs.len(), 4);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn hexapod_plan_is_valid() {
        let plan = BodyPlan::hexapod();
        assert_eq!(plan.legs.len(), 6);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn empty_plan_rejected() {
        let plan = BodyPlan::new(vec![]);
        assert!(matches!(plan.validate(), Err(PlanError::NoLegs)));
    }

    #[test]
    fn zero_length_segment_rejected() {
        let mut plan = BodyPlan::quadruped();
        plan.legs[1].segments[0].length = 0.0;
        assert!(matches!(
            plan.validate(),
            Err(PlanError::NonPositiveSegmentLength { leg: 1, segment: 0, .. })
        ));
    }

    #[test]
    fn polygon_order_walks_the_perimeter() {
        let plan = BodyPlan::hexapod();
        assert_eq!(plan.polygon_order(), vec![0, 2, 4, 5, 3, 1]);
    }

    #[test]
    fn update_order_covers_every_leg_once() {
        let plan = BodyPlan::quadruped();
        let mut order = plan.update_order();
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn symmetric_leg_segments_normalized() {
        let leg = LegPlan::symmetric(
            Vec3::new(0.25, 0.0, 0.4),
            Vec3::new(1.0, 0.0, 0.8),
            0.9,
        );
        for seg in &leg.segments {
            assert_relative_eq!(seg.direction.norm(), 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(leg.max_reach(), 1.8, epsilon = 1e-12);
    }
}
