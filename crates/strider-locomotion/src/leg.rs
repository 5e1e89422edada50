//! Per-leg target acquisition, movement, and chain solving.

use nalgebra::{UnitQuaternion, Vector3};

use strider_core::events::LocomotionEvent;
use strider_core::ground::GroundQuery;
use strider_core::math::{
    horizontal_distance, lerp, move_towards, move_towards_scalar, rotate_y_about, Vec3, DOWN,
    FORWARD,
};
use strider_core::plan::LegPlan;
use strider_core::zone::SplitDistance;
use strider_ik::{ChainSegment, KinematicChain};

use crate::body::BodyContext;

/// Distance below which a moving foot counts as arrived. Well below any
/// single-tick movement step.
const ARRIVAL_EPSILON: f64 = 1e-4;

/// Squared distance below which an idle foot is already close enough to its
/// target that starting a move would be a no-op.
const ALREADY_AT_TARGET_SQ: f64 = 0.01;

/// Vertical acceptance band around the lookahead height for the primary scan
/// ray: hits inside it are taken directly without the fallback grid.
const PRIMARY_BAND_BELOW: f64 = 0.24;
const PRIMARY_BAND_ABOVE: f64 = 1.5;

/// Cell-edge margin for the 3x3 fallback scan grid.
const SCAN_MARGIN: f64 = 2.0 / 16.0;

/// A candidate foot placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegTarget {
    pub position: Vec3,
    /// `true` for a real ground sample; `false` marks a synthetic stranded or
    /// disabled fallback.
    pub is_grounded: bool,
    /// Which scan ray produced this target. Keeps a mid-move leg locked to
    /// the candidate it already committed to.
    pub id: i32,
}

/// Quantities derived once per tick from the body pose, in one ordered step.
#[derive(Debug, Clone)]
struct LegFrame {
    rest_position: Vec3,
    trigger_zone: SplitDistance,
    comfort_zone: SplitDistance,
    comfort_zone_center: Vec3,
    look_ahead: Vec3,
    scan_start: Vec3,
    scan_vector: Vec3,
    attachment: Vec3,
}

/// One leg: its chain, its current target, and its movement state machine.
#[derive(Debug, Clone)]
pub struct Leg {
    plan: LegPlan,
    /// Solved kinematic chain; root follows the attachment point.
    pub chain: KinematicChain,
    /// Current foot target.
    pub target: LegTarget,
    /// Actual tracked foot position; interpolates toward the target rather
    /// than snapping.
    pub end_effector: Vec3,

    pub(crate) touching_ground: bool,
    pub(crate) is_moving: bool,
    time_since_begin_move: u32,
    /// Disabled legs retract instead of planting. Host-togglable.
    pub is_disabled: bool,
    /// Host-facing marker for featured legs (e.g. the front pair). Never read
    /// by the controller.
    pub is_primary: bool,
    can_move: bool,

    frame: LegFrame,
}

impl Leg {
    /// Build a leg from its plan, sampling the ground for an initial target.
    pub fn new(plan: LegPlan, ctx: &BodyContext, ground: &impl GroundQuery) -> Self {
        let frame = derive_frame(&plan, ctx);
        let chain = initial_chain(&plan, ctx, &frame);

        let mut leg = Self {
            plan,
            chain,
            target: LegTarget {
                position: frame.look_ahead,
                is_grounded: false,
                id: -1,
            },
            end_effector: frame.look_ahead,
            touching_ground: false,
            is_moving: false,
            time_since_begin_move: 0,
            is_disabled: false,
            is_primary: false,
            can_move: false,
            frame,
        };
        if let Some(target) = leg.locate_ground(ctx, ground) {
            leg.target = target;
        }
        leg.end_effector = leg.target.position;
        leg.touching_ground = leg.target.is_grounded;
        leg
    }

    /// A leg is grounded when its foot is planted, idle, and enabled.
    pub fn is_grounded(&self) -> bool {
        self.touching_ground && !self.is_moving && !self.is_disabled
    }

    pub fn touching_ground(&self) -> bool {
        self.touching_ground
    }

    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// Ticks since the current move began.
    pub fn time_since_begin_move(&self) -> u32 {
        self.time_since_begin_move
    }

    /// Last movement permission computed for this leg (policy or override).
    pub fn can_move(&self) -> bool {
        self.can_move
    }

    pub fn plan(&self) -> &LegPlan {
        &self.plan
    }

    pub fn rest_position(&self) -> Vec3 {
        self.frame.rest_position
    }

    pub fn trigger_zone(&self) -> SplitDistance {
        self.frame.trigger_zone
    }

    pub fn trigger_zone_center(&self) -> Vec3 {
        self.frame.rest_position
    }

    pub fn comfort_zone(&self) -> SplitDistance {
        self.frame.comfort_zone
    }

    pub fn comfort_zone_center(&self) -> Vec3 {
        self.frame.comfort_zone_center
    }

    pub fn look_ahead_position(&self) -> Vec3 {
        self.frame.look_ahead
    }

    pub fn scan_start_position(&self) -> Vec3 {
        self.frame.scan_start
    }

    pub fn scan_vector(&self) -> Vec3 {
        self.frame.scan_vector
    }

    pub fn attachment_position(&self) -> Vec3 {
        self.frame.attachment
    }

    /// Foot is outside the trigger zone and wants to move.
    pub fn is_outside_trigger_zone(&self) -> bool {
        !self
            .frame
            .trigger_zone
            .contains(&self.frame.rest_position, &self.end_effector)
    }

    /// Foot is outside the hard comfort bound and must move.
    pub fn is_uncomfortable(&self) -> bool {
        !self
            .frame
            .comfort_zone
            .contains(&self.frame.comfort_zone_center, &self.end_effector)
    }

    /// Recompute the per-tick derived frame. Must run before [`Self::update`]
    /// each tick.
    pub(crate) fn derive(&mut self, ctx: &BodyContext) {
        self.frame = derive_frame(&self.plan, ctx);
    }

    /// Advance the leg one tick: re-target, interpolate or plant the foot,
    /// and re-solve the chain.
    pub(crate) fn update(
        &mut self,
        ctx: &BodyContext,
        ground: &impl GroundQuery,
        policy_allows: bool,
        index: usize,
        events: &mut Vec<LocomotionEvent>,
    ) {
        let gait = ctx.gait;
        let mut did_step = false;

        self.time_since_begin_move += 1;

        // update target
        if self.is_disabled {
            self.target = self.disabled_target(ctx, ground);
        } else {
            if let Some(target) = self.locate_ground(ctx, ground) {
                self.target = target;
            }
            if !self.target.is_grounded
                || !self
                    .frame
                    .comfort_zone
                    .contains(&self.frame.comfort_zone_center, &self.target.position)
            {
                self.target = self.stranded_target();
            }
        }

        // an airborne foot inherits the body's motion so it does not lag
        // behind a moving or turning body
        if !self.is_grounded() {
            self.end_effector += ctx.velocity;
            rotate_y_about(&mut self.end_effector, ctx.yaw_velocity, &ctx.position);
        }

        // reactive ground collision
        if !self.touching_ground {
            if let Some(collision) = ground.resolve_collision(self.end_effector, DOWN) {
                did_step = true;
                self.touching_ground = true;
                self.end_effector.y = collision.position.y;
            }
        }

        if self.is_moving {
            move_towards(&mut self.end_effector, &self.target.position, gait.leg_move_speed);

            // keep the foot lifted until it is nearly above the target,
            // producing an arched step instead of a straight drag
            let lifted_y = self.target.position.y + gait.leg_lift_height;
            if horizontal_distance(&self.end_effector, &self.target.position)
                > gait.leg_drop_distance
            {
                self.end_effector.y =
                    move_towards_scalar(self.end_effector.y, lifted_y, gait.leg_move_speed);
            }

            if (self.end_effector - self.target.position).norm() < ARRIVAL_EPSILON {
                self.is_moving = false;
                self.touching_ground = ground.is_on_ground(self.end_effector);
                did_step = did_step || self.touching_ground;
            }
        } else {
            self.can_move = policy_allows || self.is_uncomfortable();

            let wants_to_move = self.is_outside_trigger_zone()
                || self.is_uncomfortable()
                || !self.touching_ground;
            let already_at_target =
                (self.end_effector - self.target.position).norm_squared() < ALREADY_AT_TARGET_SQ;

            if self.can_move && wants_to_move && !already_at_target {
                self.is_moving = true;
                self.time_since_begin_move = 0;
            }
        }

        if did_step {
            events.push(LocomotionEvent::Step { leg: index });
        }

        self.update_chain(ctx);
    }

    /// Re-anchor and re-solve the chain toward the current end effector.
    fn update_chain(&mut self, ctx: &BodyContext) {
        self.chain.root = self.frame.attachment;

        if ctx.plan.straighten_legs {
            let mut direction = self.end_effector - self.frame.attachment;
            direction.y = 0.0;
            if let Some(planar) = direction.try_normalize(1e-9) {
                let swing = UnitQuaternion::rotation_between(&FORWARD, &planar)
                    .unwrap_or_else(|| {
                        UnitQuaternion::from_axis_angle(
                            &Vector3::y_axis(),
                            std::f64::consts::PI,
                        )
                    });
                let pitch = UnitQuaternion::from_axis_angle(
                    &Vector3::x_axis(),
                    ctx.plan.straighten_rotation,
                );
                self.chain.straighten_direction(&(swing * pitch));
            }
        }

        self.chain.fabrik(&self.end_effector);
    }

    /// Whether a scan candidate may be considered. While committed to a move
    /// toward a real ground sample, only the same ray may re-target the leg,
    /// preventing target flapping mid-step.
    fn candidate_allowed(&self, id: i32) -> bool {
        if !self.is_moving {
            return true;
        }
        if !self.target.is_grounded {
            return true;
        }
        id == self.target.id
    }

    /// Scan for new footing around the lookahead position.
    ///
    /// The primary ray is accepted directly when its hit lies in a tight
    /// vertical band around the lookahead height. Otherwise a 3x3 grid of
    /// fallback rays is sampled and the candidate closest to the preferred
    /// position wins, biased upward when the way ahead is blocked. A fallback
    /// winner outside the comfort zone is rejected outright.
    fn locate_ground(&self, ctx: &BodyContext, ground: &impl GroundQuery) -> Option<LegTarget> {
        let frame = &self.frame;
        let scan_length = frame.scan_vector.norm();

        let mut id = 0;
        let mut cast = |x: f64, z: f64| -> Option<LegTarget> {
            id += 1;
            if !self.candidate_allowed(id) {
                return None;
            }
            let origin = Vec3::new(x, frame.scan_start.y, z);
            let hit = ground.raycast_ground(origin, frame.scan_vector, scan_length)?;
            Some(LegTarget {
                position: hit.position,
                is_grounded: true,
                id,
            })
        };

        let x = frame.scan_start.x;
        let z = frame.scan_start.z;

        let main = cast(x, z);

        if !ctx.gait.leg_scan_alternative_ground {
            return main;
        }

        if let Some(candidate) = main {
            let y = candidate.position.y;
            if y >= frame.look_ahead.y - PRIMARY_BAND_BELOW
                && y <= frame.look_ahead.y + PRIMARY_BAND_ABOVE
            {
                return main;
            }
        }

        let nx = x.floor() - SCAN_MARGIN;
        let nz = z.floor() - SCAN_MARGIN;
        let px = x.ceil() + SCAN_MARGIN;
        let pz = z.ceil() + SCAN_MARGIN;

        let candidates = [
            cast(nx, nz),
            cast(nx, z),
            cast(nx, pz),
            cast(x, nz),
            main,
            cast(x, pz),
            cast(px, nz),
            cast(px, z),
            cast(px, pz),
        ];

        let mut preferred = frame.look_ahead;
        if self.obstacle_ahead(ctx, ground) {
            preferred.y += ctx.gait.leg_scan_height_bias;
        }

        let best = candidates.into_iter().flatten().min_by(|a, b| {
            let da = (a.position - preferred).norm_squared();
            let db = (b.position - preferred).norm_squared();
            da.total_cmp(&db)
        })?;

        if !frame
            .comfort_zone
            .contains(&frame.comfort_zone_center, &best.position)
        {
            return None;
        }

        Some(best)
    }

    /// Probe the column one unit ahead of the lookahead. A surface well above
    /// the lookahead height means a step or wall to climb onto.
    fn obstacle_ahead(&self, ctx: &BodyContext, ground: &impl GroundQuery) -> bool {
        let ahead = self.frame.look_ahead + ctx.facing_direction();
        let origin = ahead + Vec3::new(0.0, 1.0, 0.0);
        match ground.raycast_ground(origin, DOWN, 1.0) {
            Some(hit) => hit.position.y > self.frame.look_ahead.y + 0.1,
            None => false,
        }
    }

    /// Synthetic target at the lookahead when no valid ground is available.
    fn stranded_target(&self) -> LegTarget {
        LegTarget {
            position: self.frame.look_ahead,
            is_grounded: false,
            id: -1,
        }
    }

    /// Lifted retraction target for a disabled leg, biased toward any ground
    /// directly below the foot.
    fn disabled_target(&self, ctx: &BodyContext, ground: &impl GroundQuery) -> LegTarget {
        let mut target = self.stranded_target();
        target.position.y += ctx.gait.body_height / 2.0;

        let probe = self.end_effector + Vec3::new(0.0, 0.5, 0.0);
        if let Some(hit) = ground.raycast_ground(probe, DOWN, 2.0) {
            if hit.position.y > target.position.y {
                target.position.y = hit.position.y + ctx.gait.body_height * 0.3;
            }
        }
        target
    }
}

/// Build the initial chain with joints distributed outward along the rest
/// direction, so the first solve starts from a sensible posture.
fn initial_chain(plan: &LegPlan, ctx: &BodyContext, frame: &LegFrame) -> KinematicChain {
    let outward = plan
        .rest
        .try_normalize(1e-9)
        .unwrap_or(FORWARD);
    let mut stride = 0.0;
    let segments = plan
        .segments
        .iter()
        .map(|seg| {
            stride += seg.length;
            ChainSegment::new(ctx.position + outward * stride, seg.length, seg.direction)
        })
        .collect();
    KinematicChain::new(frame.attachment, segments)
}

/// Compute all per-tick derived quantities in one ordered step.
fn derive_frame(plan: &LegPlan, ctx: &BodyContext) -> LegFrame {
    let gait = ctx.gait;
    let orientation = ctx.orientation();

    // trigger zone: widens with walking speed, snaps wide while turning
    let trigger_zone = if ctx.is_rotating_yaw() {
        gait.walking_trigger_zone
    } else {
        let fraction = (ctx.velocity.norm() / gait.walk_speed).min(1.0);
        gait.stationary_trigger_zone
            .lerp(&gait.walking_trigger_zone, fraction)
    };

    // rest position: plan offset lowered to foot level, in world space
    let mut rest = plan.rest;
    rest.y -= gait.body_height;
    let rest_position = orientation * rest + ctx.position;

    // comfort zone: extends from below the rest position up past the body
    let mut comfort_zone_center = rest_position;
    comfort_zone_center.y = lerp(rest_position.y, ctx.position.y, 0.5);
    let comfort_zone = SplitDistance::new(
        gait.comfort_zone.horizontal,
        gait.comfort_zone.vertical + (ctx.position.y - rest_position.y),
    );

    // lookahead: rest position displaced along the direction of travel
    let look_ahead = if !ctx.is_walking {
        rest_position
    } else {
        let direction = ctx
            .velocity
            .try_normalize(1e-9)
            .unwrap_or_else(|| ctx.facing_direction());
        let mut ahead = rest_position
            + direction * (trigger_zone.horizontal * gait.leg_look_ahead_fraction);
        rotate_y_about(&mut ahead, ctx.yaw_velocity, &ctx.position);
        ahead
    };

    // scan column above and through the lookahead; yaw only (a no-op on a
    // vertical vector), so the scan ray stays vertical under body pitch
    let scan_start = look_ahead + Vec3::new(0.0, gait.body_height * 1.6, 0.0);
    let scan_vector = Vec3::new(0.0, -gait.body_height * 3.5, 0.0);

    let attachment = orientation * plan.attachment + ctx.position;

    LegFrame {
        rest_position,
        trigger_zone,
        comfort_zone,
        comfort_zone_center,
        look_ahead,
        scan_start,
        scan_vector,
        attachment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use strider_core::config::GaitConfig;
    use strider_core::plan::BodyPlan;
    use strider_test_utils::Terrain;

    fn context<'a>(
        gait: &'a GaitConfig,
        plan: &'a BodyPlan,
        yaw: f64,
        pitch: f64,
    ) -> BodyContext<'a> {
        BodyContext {
            gait,
            plan,
            position: Vec3::new(0.0, gait.body_height, 0.0),
            velocity: Vec3::zeros(),
            yaw,
            pitch,
            yaw_velocity: 0.0,
            is_walking: false,
        }
    }

    #[test]
    fn grounded_requires_planted_idle_and_enabled() {
        let terrain = Terrain::flat(0.0);
        let gait = GaitConfig::default();
        let plan = BodyPlan::quadruped();
        let ctx = context(&gait, &plan, 0.0, 0.0);
        let mut leg = Leg::new(plan.legs[0].clone(), &ctx, &terrain);
        assert!(leg.is_grounded());

        leg.is_moving = true;
        assert!(!leg.is_grounded());
        leg.is_moving = false;

        leg.is_disabled = true;
        assert!(!leg.is_grounded());
        leg.is_disabled = false;

        leg.touching_ground = false;
        assert!(!leg.is_grounded());
        leg.touching_ground = true;

        // the host marker has no bearing on support
        leg.is_primary = true;
        assert!(leg.is_grounded());
    }

    #[test]
    fn scan_ray_stays_vertical_under_pitch() {
        let terrain = Terrain::flat(0.0);
        let gait = GaitConfig::default();
        let plan = BodyPlan::quadruped();

        for (yaw, pitch) in [(0.0, 0.4), (0.7, -0.3)] {
            let ctx = context(&gait, &plan, yaw, pitch);
            let leg = Leg::new(plan.legs[0].clone(), &ctx, &terrain);

            let scan = leg.scan_vector();
            assert_relative_eq!(scan.x, 0.0, epsilon = 1e-12);
            assert_relative_eq!(scan.z, 0.0, epsilon = 1e-12);
            assert_relative_eq!(scan.y, -gait.body_height * 3.5, epsilon = 1e-12);

            // the scan column sits directly above the lookahead
            let start = leg.scan_start_position();
            let ahead = leg.look_ahead_position();
            assert_relative_eq!(start.x, ahead.x, epsilon = 1e-12);
            assert_relative_eq!(start.z, ahead.z, epsilon = 1e-12);
            assert!(start.y > ahead.y);
        }
    }
}
