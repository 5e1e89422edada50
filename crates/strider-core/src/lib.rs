// strider-core: zones, gait configuration, body plans, ground queries, events.

pub mod config;
pub mod error;
pub mod events;
pub mod ground;
pub mod math;
pub mod plan;
pub mod zone;

pub use config::GaitConfig;
pub use error::{ConfigError, PlanError, StriderError};
pub use events::LocomotionEvent;
pub use ground::{CollisionHit, GroundQuery, RaycastHit};
pub use plan::{BodyPlan, LegPlan, SegmentPlan};
pub use zone::SplitDistance;
