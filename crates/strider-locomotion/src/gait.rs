//! Move-gating policies.
//!
//! A policy decides whether an idle leg is permitted to begin a step this
//! tick. Its job is load balancing: keep a bounded subset of legs in flight
//! and keep the stance from tangling. It is advisory only — a leg outside its
//! comfort zone overrides the policy and moves regardless (see `Leg`).

use strider_core::plan::BodyPlan;

use crate::leg::Leg;

/// Closed set of gait policies, dispatched per decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaitPolicy {
    /// Conservative stepping: neighbours in the support polygon and the
    /// paired leg stay planted while a leg is in flight.
    Walk,
    /// Bounding gait: legs step together in diagonal teams.
    Gallop,
}

impl GaitPolicy {
    pub fn from_config(gait: &strider_core::config::GaitConfig) -> Self {
        if gait.gallop {
            Self::Gallop
        } else {
            Self::Walk
        }
    }

    /// Whether `legs[index]` may begin moving this tick.
    pub fn can_move_leg(&self, legs: &[Leg], index: usize, plan: &BodyPlan) -> bool {
        match self {
            Self::Walk => walk_can_move(legs, index, plan),
            Self::Gallop => gallop_can_move(legs, index),
        }
    }
}

/// Upper bound on concurrently moving legs under the walk policy.
pub(crate) const fn max_concurrent_movers(leg_count: usize) -> usize {
    let half = leg_count / 2;
    if half == 0 {
        1
    } else {
        half
    }
}

fn walk_can_move(legs: &[Leg], index: usize, plan: &BodyPlan) -> bool {
    let moving = legs.iter().filter(|l| l.is_moving()).count();
    if moving >= max_concurrent_movers(legs.len()) {
        return false;
    }

    // neighbours along the support polygon stay planted so the polygon never
    // collapses around the centre of mass
    let order = plan.polygon_order();
    let n = order.len();
    let Some(position) = order.iter().position(|&i| i == index) else {
        return false;
    };
    let prev = order[(position + n - 1) % n];
    let next = order[(position + 1) % n];
    if prev != index && legs[prev].is_moving() {
        return false;
    }
    if next != index && legs[next].is_moving() {
        return false;
    }

    // the paired leg on the other side stays planted
    let opposite = index ^ 1;
    if opposite < legs.len() && legs[opposite].is_moving() {
        return false;
    }

    true
}

fn gallop_can_move(legs: &[Leg], index: usize) -> bool {
    let team = diagonal_team(index);
    legs.iter()
        .enumerate()
        .all(|(i, leg)| !leg.is_moving() || diagonal_team(i) == team)
}

/// Diagonal team of a leg under the pair-ordering convention: front-left and
/// rear-right share a team, front-right and rear-left the other.
const fn diagonal_team(index: usize) -> usize {
    (index / 2 + index % 2) % 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_teams_for_quadruped() {
        // Legs: 0 = front-left, 1 = front-right, 2 = rear-left, 3 = rear-right
        assert_eq!(diagonal_team(0), diagonal_team(3));
        assert_eq!(diagonal_team(1), diagonal_team(2));
        assert_ne!(diagonal_team(0), diagonal_team(1));
    }

    #[test]
    fn mover_bound_is_half_the_legs() {
        assert_eq!(max_concurrent_movers(4), 2);
        assert_eq!(max_concurrent_movers(6), 3);
        assert_eq!(max_concurrent_movers(1), 1);
    }
}
