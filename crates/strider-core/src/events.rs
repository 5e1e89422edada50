//! Notifications produced by a simulation tick.
//!
//! The controller never calls back into the host. Each tick returns a list of
//! events which the host drains and routes to renderers, audio, or effects.

/// Fire-and-forget notification emitted during a body update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocomotionEvent {
    /// A foot re-acquired ground contact this tick.
    Step { leg: usize },
    /// The body struck the ground. `impact` is the penetration depth that was
    /// corrected, a proxy for impact speed. Only emitted when the impact
    /// exceeds the resting-jitter threshold.
    HitGround { impact: f64 },
}

impl LocomotionEvent {
    /// Whether this event is a leg step.
    pub const fn is_step(&self) -> bool {
        matches!(self, Self::Step { .. })
    }
}
