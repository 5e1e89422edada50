//! Procedural locomotion for multi-legged creatures.
//!
//! A [`Body`] owns a set of [`Leg`]s described by a
//! [`BodyPlan`](strider_core::plan::BodyPlan). Each tick the body integrates
//! gravity, drag, and a support-polygon stabilizer, then updates every leg:
//! legs pick ground targets with hysteresis zones, interpolate their feet
//! through the air, and solve their joint chains with FABRIK.
//!
//! The world is abstracted behind [`GroundQuery`](strider_core::ground::GroundQuery);
//! the controller never assumes a particular terrain representation.

pub mod body;
pub mod gait;
pub mod leg;
pub mod polygon;


pub use body::{Body, BodyContext};
pub use gait::GaitPolicy;
pub use leg::{Leg, LegTarget};

pub use strider_core::config::GaitConfig;
pub use strider_core::events::LocomotionEvent;
pub use strider_core::plan::{BodyPlan, LegPlan};
