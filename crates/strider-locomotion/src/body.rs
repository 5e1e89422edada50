//! Body gross motion, support-polygon stability, and leg orchestration.

use nalgebra::{UnitQuaternion, Vector3};
use tracing::{debug, trace};

use strider_core::config::GaitConfig;
use strider_core::error::StriderError;
use strider_core::events::LocomotionEvent;
use strider_core::ground::GroundQuery;
use strider_core::math::{average, lerp, to_planar, Vec3, FORWARD};
use strider_core::plan::BodyPlan;

use crate::gait::GaitPolicy;
use crate::leg::Leg;
use crate::polygon::{nearest_point_on_polygon, point_in_polygon};

/// Yaw velocities below this count as not rotating.
const YAW_EPSILON: f64 = 1e-4;

/// Read-only body state handed to each leg during its update.
///
/// Legs hold no reference back to the body; everything shared flows through
/// this context, built fresh for each leg update within a tick.
pub struct BodyContext<'a> {
    pub gait: &'a GaitConfig,
    pub plan: &'a BodyPlan,
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f64,
    pub pitch: f64,
    pub yaw_velocity: f64,
    pub is_walking: bool,
}

impl BodyContext<'_> {
    /// Full body orientation: yaw about Y, then pitch about X.
    pub fn orientation(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch)
    }

    /// Horizontal heading the body faces.
    pub fn facing_direction(&self) -> Vec3 {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw) * FORWARD
    }

    pub fn is_rotating_yaw(&self) -> bool {
        self.yaw_velocity.abs() > YAW_EPSILON
    }
}

/// The creature's body: owns all legs, integrates gross motion, and keeps
/// itself stable above the support polygon.
#[derive(Debug)]
pub struct Body {
    pub position: Vec3,
    pub velocity: Vec3,
    pub yaw: f64,
    pub pitch: f64,
    /// Host-driven turn rate, radians per tick.
    pub yaw_velocity: f64,
    /// Host-driven flag: the creature is actively driving itself forward, so
    /// ground drag must not damp the stride away.
    pub is_walking: bool,

    pub legs: Vec<Leg>,

    /// Foot-average centre of mass, blended toward the body position and
    /// pulled toward the acceleration origin.
    pub centre_of_mass: Vec3,
    /// Point the corrective acceleration acts from.
    pub acceleration_origin: Vec3,
    /// Corrective acceleration applied this tick.
    pub acceleration: Vec3,
    pub is_stable: bool,
    pub on_ground: bool,

    plan: BodyPlan,
    gait: GaitConfig,
    policy: GaitPolicy,
}

impl Body {
    /// Build a body and its legs, validating plan and configuration.
    pub fn new(
        position: Vec3,
        yaw: f64,
        plan: BodyPlan,
        gait: GaitConfig,
        ground: &impl GroundQuery,
    ) -> Result<Self, StriderError> {
        plan.validate()?;
        gait.validate()?;
        let policy = GaitPolicy::from_config(&gait);

        let ctx = BodyContext {
            gait: &gait,
            plan: &plan,
            position,
            velocity: Vec3::zeros(),
            yaw,
            pitch: 0.0,
            yaw_velocity: 0.0,
            is_walking: false,
        };
        let legs = plan
            .legs
            .iter()
            .cloned()
            .map(|leg_plan| Leg::new(leg_plan, &ctx, ground))
            .collect();

        Ok(Self {
            position,
            velocity: Vec3::zeros(),
            yaw,
            pitch: 0.0,
            yaw_velocity: 0.0,
            is_walking: false,
            legs,
            centre_of_mass: position,
            acceleration_origin: position,
            acceleration: Vec3::zeros(),
            is_stable: true,
            on_ground: false,
            plan,
            gait,
            policy,
        })
    }

    pub fn gait(&self) -> &GaitConfig {
        &self.gait
    }

    pub fn plan(&self) -> &BodyPlan {
        &self.plan
    }

    /// Swap the gait configuration between ticks. Mid-tick configuration is
    /// immutable by construction; this is the only write path.
    pub fn set_gait(&mut self, gait: GaitConfig) -> Result<(), StriderError> {
        gait.validate()?;
        self.policy = GaitPolicy::from_config(&gait);
        self.gait = gait;
        Ok(())
    }

    /// Advance the simulation one tick.
    ///
    /// Gross motion (gravity, drag, stabilization, collision) runs first,
    /// then every leg updates in the plan's fixed traversal order, so the
    /// next tick's stabilization reads this tick's foot positions.
    pub fn update(&mut self, ground: &impl GroundQuery) -> Vec<LocomotionEvent> {
        let mut events = Vec::new();

        // integrate the host-driven turn rate so leg inheritance and the
        // body heading stay consistent within the tick
        self.yaw += self.yaw_velocity;

        let grounded: Vec<usize> = self
            .plan
            .polygon_order()
            .into_iter()
            .filter(|&i| self.legs[i].is_grounded())
            .collect();
        let grounded_fraction = grounded.len() as f64 / self.legs.len() as f64;

        // gravity and air drag
        self.velocity.y -= self.gait.gravity_acceleration;
        self.velocity.y *= 1.0 - self.gait.air_drag_coefficient;

        // ground drag, skipped while walking so the stride is not damped away
        if !self.is_walking {
            let drag = self.gait.ground_drag_coefficient * grounded_fraction;
            self.velocity.x *= drag;
            self.velocity.z *= drag;
        }
        if self.on_ground {
            self.velocity.x *= 0.5;
            self.velocity.z *= 0.5;
        }

        self.stabilize(&grounded, grounded_fraction);
        self.velocity += self.acceleration;

        // apply velocity
        self.position += self.velocity;

        self.resolve_body_collision(ground, &mut events);

        // update legs in fixed traversal order
        for index in self.plan.update_order() {
            let ctx = BodyContext {
                gait: &self.gait,
                plan: &self.plan,
                position: self.position,
                velocity: self.velocity,
                yaw: self.yaw,
                pitch: self.pitch,
                yaw_velocity: self.yaw_velocity,
                is_walking: self.is_walking,
            };
            self.legs[index].derive(&ctx);
            let allowed = self.policy.can_move_leg(&self.legs, index, &self.plan);
            self.legs[index].update(&ctx, ground, allowed, index, &mut events);
        }

        trace!(
            stable = self.is_stable,
            on_ground = self.on_ground,
            grounded = grounded.len(),
            "tick complete"
        );
        events
    }

    /// Compute centre of mass, support polygon, stability, and the corrective
    /// acceleration from last tick's foot positions.
    fn stabilize(&mut self, grounded: &[usize], grounded_fraction: f64) {
        let gait = &self.gait;

        let mut com = average(self.legs.iter().map(|l| l.end_effector));
        com += (self.position - com) * 0.5;
        com.y += 0.01;
        self.centre_of_mass = com;

        if grounded.is_empty() {
            self.is_stable = false;
            self.acceleration_origin = self.position;
            self.acceleration = Vec3::zeros();
            return;
        }

        // vertical correction authority scales with ground contact and only
        // ever rights the body upward
        let desired = (self.preferred_height() - self.position.y - self.velocity.y).max(0.0);
        let capable = gait.body_height_correction_acceleration * grounded_fraction;
        let magnitude = desired.min(capable);

        let force_y = grounded
            .iter()
            .map(|&i| self.legs[i].end_effector.y)
            .sum::<f64>()
            / grounded.len() as f64;

        let polygon: Vec<_> = grounded
            .iter()
            .map(|&i| to_planar(&self.legs[i].end_effector))
            .collect();
        let com_planar = to_planar(&self.centre_of_mass);

        if polygon.len() > 1 {
            if point_in_polygon(&com_planar, &polygon) {
                self.is_stable = true;
                self.acceleration_origin =
                    Vec3::new(self.centre_of_mass.x, force_y, self.centre_of_mass.z);
            } else {
                if self.is_stable {
                    debug!("centre of mass left the support polygon");
                }
                self.is_stable = false;
                let nearest = nearest_point_on_polygon(&com_planar, &polygon);
                self.acceleration_origin = Vec3::new(nearest.x, force_y, nearest.y);
            }
        } else {
            self.is_stable = false;
            self.acceleration_origin = self.legs[grounded[0]].end_effector;
        }

        // exponential pull, not an instantaneous snap
        self.centre_of_mass.x = lerp(
            self.centre_of_mass.x,
            self.acceleration_origin.x,
            gait.stabilization_factor,
        );
        self.centre_of_mass.z = lerp(
            self.centre_of_mass.z,
            self.acceleration_origin.z,
            gait.stabilization_factor,
        );

        self.acceleration = if self.is_stable {
            Vec3::new(0.0, magnitude, 0.0)
        } else {
            let direction = self.centre_of_mass - self.acceleration_origin;
            match direction.try_normalize(1e-9) {
                Some(dir) => {
                    let acc = dir * magnitude;
                    // never lurch sideways faster than the body rights itself
                    if acc.x.hypot(acc.z) > acc.y {
                        Vec3::zeros()
                    } else {
                        acc
                    }
                }
                None => Vec3::zeros(),
            }
        };
    }

    /// Height the body is trying to hold: average leg target height plus the
    /// configured body height, blended by the correction factor.
    fn preferred_height(&self) -> f64 {
        let average_y = self
            .legs
            .iter()
            .map(|l| l.target.position.y)
            .sum::<f64>()
            / self.legs.len() as f64;
        lerp(
            self.position.y,
            average_y + self.gait.body_height,
            self.gait.body_height_correction_factor,
        )
    }

    /// Snap out of the ground, bounce, and report hard impacts.
    fn resolve_body_collision(
        &mut self,
        ground: &impl GroundQuery,
        events: &mut Vec<LocomotionEvent>,
    ) {
        let gait = &self.gait;
        let probe = Vec3::new(0.0, (-1.0f64).min(-self.velocity.y.abs()), 0.0);

        if let Some(collision) = ground.resolve_collision(self.position, probe) {
            self.on_ground = true;

            let impact = collision.offset.norm();
            let threshold = gait.gravity_acceleration * 2.0 * (1.0 - gait.air_drag_coefficient);
            if impact > threshold {
                debug!(impact, "body hit ground");
                events.push(LocomotionEvent::HitGround { impact });
            }

            self.position.y = collision.position.y;
            if self.velocity.y < 0.0 {
                self.velocity.y *= -gait.bounce_factor;
            }
            // kill residual bounce below one tick of gravity
            if self.velocity.y < gait.gravity_acceleration {
                self.velocity.y = 0.0;
            }
        } else {
            self.on_ground = ground.is_on_ground(self.position);
        }
    }
}
