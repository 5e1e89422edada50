//! Kinematic chains and the FABRIK solve.

use nalgebra::UnitQuaternion;

use strider_core::math::{Vec3, DOWN};

/// One rigid segment of a chain.
///
/// `position` is the world-space joint at the far end of the segment
/// (the end closer to the foot). Segment lengths are preserved exactly by
/// every solver pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSegment {
    /// World position of the segment's outer joint.
    pub position: Vec3,
    /// Rigid length, positive.
    pub length: f64,
    /// Rest direction used by [`KinematicChain::straighten_direction`].
    pub rest_direction: Vec3,
}

impl ChainSegment {
    pub fn new(position: Vec3, length: f64, rest_direction: Vec3) -> Self {
        Self {
            position,
            length,
            rest_direction,
        }
    }
}

/// Solver parameters for a FABRIK solve.
#[derive(Debug, Clone)]
pub struct FabrikConfig {
    /// Backward+forward pass pairs per solve. Small because the solve is
    /// warm-started from the previous tick's joint positions.
    pub iterations: u32,
    /// Early-out distance between end effector and target.
    pub tolerance: f64,
}

impl Default for FabrikConfig {
    fn default() -> Self {
        Self {
            iterations: 4,
            tolerance: 1e-4,
        }
    }
}

/// An ordered chain of rigid segments anchored at `root`.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicChain {
    /// Anchor of the first segment, set by the owning leg every tick.
    pub root: Vec3,
    /// Segments from root to end effector.
    pub segments: Vec<ChainSegment>,
}

impl KinematicChain {
    pub fn new(root: Vec3, segments: Vec<ChainSegment>) -> Self {
        Self { root, segments }
    }

    /// Sum of segment lengths; the farthest point the chain can reach.
    pub fn max_reach(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }

    /// Current end-effector position (the last joint), or the root for an
    /// empty chain.
    pub fn end_effector(&self) -> Vec3 {
        self.segments.last().map_or(self.root, |s| s.position)
    }

    /// World positions of every joint, root first.
    pub fn joints(&self) -> Vec<Vec3> {
        let mut joints = Vec::with_capacity(self.segments.len() + 1);
        joints.push(self.root);
        joints.extend(self.segments.iter().map(|s| s.position));
        joints
    }

    /// Pre-pose the chain along its rest directions rotated by `rotation`.
    ///
    /// This biases which of the many valid joint configurations the solve
    /// converges to (legs default to a natural outward posture); it does not
    /// change where the end effector ends up, because [`Self::fabrik`] still
    /// pins it to the target.
    pub fn straighten_direction(&mut self, rotation: &UnitQuaternion<f64>) {
        let mut position = self.root;
        for segment in &mut self.segments {
            position += rotation * (segment.rest_direction * segment.length);
            segment.position = position;
        }
    }

    /// Solve the chain toward `target` with default parameters.
    pub fn fabrik(&mut self, target: &Vec3) {
        self.fabrik_with(target, &FabrikConfig::default());
    }

    /// Solve the chain toward `target`.
    ///
    /// If the target is beyond the chain's reach the chain fully extends in a
    /// straight line toward it. Otherwise backward and forward reaching
    /// passes alternate until the end effector is within tolerance or the
    /// iteration budget runs out.
    pub fn fabrik_with(&mut self, target: &Vec3, config: &FabrikConfig) {
        if self.segments.is_empty() {
            return;
        }

        let to_target = target - self.root;
        if to_target.norm() >= self.max_reach() {
            let direction = to_target.try_normalize(1e-12).unwrap_or(DOWN);
            let mut position = self.root;
            for segment in &mut self.segments {
                position += direction * segment.length;
                segment.position = position;
            }
            return;
        }

        for _ in 0..config.iterations {
            self.backward_pass(target);
            self.forward_pass();
            if (self.end_effector() - target).norm() < config.tolerance {
                break;
            }
        }
    }

    /// Pull the last joint onto the target and propagate corrections toward
    /// the root, preserving segment lengths.
    fn backward_pass(&mut self, target: &Vec3) {
        let n = self.segments.len();
        self.segments[n - 1].position = *target;
        for i in (0..n - 1).rev() {
            let next = self.segments[i + 1].position;
            let direction = (self.segments[i].position - next)
                .try_normalize(1e-12)
                .unwrap_or(DOWN);
            self.segments[i].position = next + direction * self.segments[i + 1].length;
        }
    }

    /// Re-anchor the first joint to the root and propagate corrections toward
    /// the end effector, preserving segment lengths.
    fn forward_pass(&mut self) {
        let mut previous = self.root;
        for segment in &mut self.segments {
            let direction = (segment.position - previous)
                .try_normalize(1e-12)
                .unwrap_or(DOWN);
            segment.position = previous + direction * segment.length;
            previous = segment.position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_segment_chain() -> KinematicChain {
        KinematicChain::new(
            Vec3::zeros(),
            vec![
                ChainSegment::new(Vec3::new(1.0, 0.0, 0.0), 1.0, Vec3::new(0.0, 0.0, 1.0)),
                ChainSegment::new(Vec3::new(2.0, 0.0, 0.0), 1.0, Vec3::new(0.0, 0.0, 1.0)),
            ],
        )
    }

    fn segment_lengths_preserved(chain: &KinematicChain) {
        let joints = chain.joints();
        for (i, segment) in chain.segments.iter().enumerate() {
            let actual = (joints[i + 1] - joints[i]).norm();
            assert_relative_eq!(actual, segment.length, epsilon = 1e-9);
        }
    }

    #[test]
    fn reachable_target_is_pinned() {
        let mut chain = two_segment_chain();
        let target = Vec3::new(1.0, 0.8, 0.3);
        chain.fabrik(&target);
        assert!((chain.end_effector() - target).norm() < 1e-3);
        segment_lengths_preserved(&chain);
    }

    #[test]
    fn unreachable_target_fully_extends() {
        let mut chain = two_segment_chain();
        let target = Vec3::new(5.0, 0.0, 0.0);
        chain.fabrik(&target);
        assert_relative_eq!(
            chain.end_effector(),
            Vec3::new(2.0, 0.0, 0.0),
            epsilon = 1e-9
        );
        segment_lengths_preserved(&chain);
    }

    #[test]
    fn incremental_solve_tracks_moving_target() {
        let mut chain = two_segment_chain();
        // Small per-tick displacements, like a foot in flight.
        let mut target = Vec3::new(1.2, 0.0, 0.0);
        for _ in 0..50 {
            target += Vec3::new(0.01, 0.005, -0.002);
            chain.fabrik(&target);
            if (target - chain.root).norm() < chain.max_reach() {
                assert!((chain.end_effector() - target).norm() < 1e-3);
            }
            segment_lengths_preserved(&chain);
        }
    }

    #[test]
    fn moved_root_is_re_anchored() {
        let mut chain = two_segment_chain();
        let target = Vec3::new(1.0, 0.5, 0.0);
        chain.fabrik(&target);
        chain.root = Vec3::new(0.2, 0.1, 0.0);
        chain.fabrik(&target);
        let joints = chain.joints();
        assert_relative_eq!(joints[0], chain.root);
        segment_lengths_preserved(&chain);
    }

    #[test]
    fn straighten_does_not_move_solved_end_effector() {
        let mut chain = two_segment_chain();
        let target = Vec3::new(0.9, 0.6, 0.4);
        chain.fabrik(&target);

        let rotation =
            UnitQuaternion::from_axis_angle(&nalgebra::Vector3::y_axis(), 0.7);
        chain.straighten_direction(&rotation);
        chain.fabrik(&target);
        assert!((chain.end_effector() - target).norm() < 1e-3);
        segment_lengths_preserved(&chain);
    }

    #[test]
    fn straighten_places_joints_along_rotated_rest_directions() {
        let mut chain = two_segment_chain();
        let identity = UnitQuaternion::identity();
        chain.straighten_direction(&identity);
        // Rest directions point along +Z with unit lengths.
        assert_relative_eq!(
            chain.segments[0].position,
            Vec3::new(0.0, 0.0, 1.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            chain.segments[1].position,
            Vec3::new(0.0, 0.0, 2.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn empty_chain_solve_is_a_no_op() {
        let mut chain = KinematicChain::new(Vec3::zeros(), vec![]);
        chain.fabrik(&Vec3::new(1.0, 1.0, 1.0));
        assert_relative_eq!(chain.end_effector(), Vec3::zeros());
    }

    #[test]
    fn exact_reach_extends_straight() {
        let mut chain = two_segment_chain();
        let target = Vec3::new(0.0, 2.0, 0.0);
        chain.fabrik(&target);
        assert_relative_eq!(chain.end_effector(), target, epsilon = 1e-9);
    }
}
