//! Deterministic heightfield terrain for locomotion tests.

use rand::Rng;
use strider_core::ground::{CollisionHit, GroundQuery, RaycastHit};
use strider_core::math::Vec3;

use crate::rng::seeded_rng;

/// Ray-march step length used before bisecting onto the surface.
const MARCH_STEP: f64 = 0.05;
const BISECT_ITERATIONS: usize = 24;
const ON_GROUND_TOLERANCE: f64 = 1e-3;

enum Profile {
    Flat { height: f64 },
    Stepped { run: f64, rise: f64 },
    Rough { seed: u64, amplitude: f64 },
}

/// A synthetic heightfield world. Everything at or below the local surface
/// height is solid ground.
pub struct Terrain {
    profile: Profile,
}

impl Terrain {
    /// Perfectly flat ground at the given height.
    pub fn flat(height: f64) -> Self {
        Self {
            profile: Profile::Flat { height },
        }
    }

    /// A staircase rising in the +x direction: each `run` units of x raise
    /// the surface by `rise`.
    pub fn stepped(run: f64, rise: f64) -> Self {
        Self {
            profile: Profile::Stepped { run, rise },
        }
    }

    /// Deterministic bumpy ground: value noise on a unit lattice with
    /// heights in `[0, amplitude)`, bilinearly interpolated.
    pub fn rough(seed: u64, amplitude: f64) -> Self {
        Self {
            profile: Profile::Rough { seed, amplitude },
        }
    }

    /// Surface height at the given horizontal coordinates.
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        match self.profile {
            Profile::Flat { height } => height,
            Profile::Stepped { run, rise } => (x / run).floor() * rise,
            Profile::Rough { seed, amplitude } => {
                let ix = x.floor();
                let iz = z.floor();
                let fx = x - ix;
                let fz = z - iz;
                let h00 = lattice_height(seed, ix as i64, iz as i64, amplitude);
                let h10 = lattice_height(seed, ix as i64 + 1, iz as i64, amplitude);
                let h01 = lattice_height(seed, ix as i64, iz as i64 + 1, amplitude);
                let h11 = lattice_height(seed, ix as i64 + 1, iz as i64 + 1, amplitude);
                let h0 = h00 + (h10 - h00) * fx;
                let h1 = h01 + (h11 - h01) * fx;
                h0 + (h1 - h0) * fz
            }
        }
    }

    fn surface_point(&self, x: f64, z: f64) -> Vec3 {
        Vec3::new(x, self.height_at(x, z), z)
    }

    /// Signed height above the surface; non-positive means inside ground.
    fn clearance(&self, p: &Vec3) -> f64 {
        p.y - self.height_at(p.x, p.z)
    }
}

/// Deterministic per-lattice-point height from the terrain seed.
fn lattice_height(seed: u64, ix: i64, iz: i64, amplitude: f64) -> f64 {
    let mixed = seed
        ^ (ix as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (iz as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    let mut rng = seeded_rng(mixed);
    rng.gen_range(0.0..amplitude)
}

impl GroundQuery for Terrain {
    fn raycast_ground(&self, origin: Vec3, direction: Vec3, max_length: f64) -> Option<RaycastHit> {
        let dir = direction.try_normalize(1e-9)?;

        if self.clearance(&origin) <= 0.0 {
            // cast began inside ground; report the surface of that column
            return Some(RaycastHit {
                position: self.surface_point(origin.x, origin.z),
            });
        }

        let mut prev_t = 0.0;
        let mut t = MARCH_STEP;
        while t <= max_length {
            let p = origin + dir * t;
            if self.clearance(&p) <= 0.0 {
                // bisect between the last point in air and this one
                let mut lo = prev_t;
                let mut hi = t;
                for _ in 0..BISECT_ITERATIONS {
                    let mid = (lo + hi) * 0.5;
                    if self.clearance(&(origin + dir * mid)) <= 0.0 {
                        hi = mid;
                    } else {
                        lo = mid;
                    }
                }
                let hit = origin + dir * hi;
                return Some(RaycastHit {
                    position: self.surface_point(hit.x, hit.z),
                });
            }
            prev_t = t;
            t += MARCH_STEP;
        }

        // check the exact endpoint so max_length is inclusive
        let end = origin + dir * max_length;
        if self.clearance(&end) <= 0.0 {
            return Some(RaycastHit {
                position: self.surface_point(end.x, end.z),
            });
        }
        None
    }

    fn resolve_collision(&self, position: Vec3, _direction: Vec3) -> Option<CollisionHit> {
        let surface = self.height_at(position.x, position.z);
        if position.y < surface {
            Some(CollisionHit {
                position: Vec3::new(position.x, surface, position.z),
                offset: Vec3::new(0.0, surface - position.y, 0.0),
            })
        } else {
            None
        }
    }

    fn is_on_ground(&self, position: Vec3) -> bool {
        self.clearance(&position) <= ON_GROUND_TOLERANCE
    }
}
