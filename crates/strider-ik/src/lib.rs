//! Inverse kinematics for strider legs.
//!
//! Provides a forward-and-backward-reaching (FABRIK) solver over chains of
//! rigid segments. The solver is incremental: it is re-run every tick with a
//! root and target that have moved only slightly since the previous solve, so
//! a small fixed iteration count is enough to stay within tolerance.
//!
//! # Architecture
//!
//! ```text
//! LegPlan ──► KinematicChain ──► fabrik(target) ──► joint positions
//! ```
//!
//! The chain's `root` is re-anchored by its owning leg every tick; the solve
//! then pins the end effector to the target (clamped to the chain's reach
//! when unreachable).

pub mod chain;

pub use chain::{ChainSegment, FabrikConfig, KinematicChain};
