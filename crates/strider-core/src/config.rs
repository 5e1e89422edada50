//! Gait parameters.
//!
//! One immutable configuration bundle read by every component. All distances
//! and speeds are in world units per tick; the host must keep a `GaitConfig`
//! stable for the duration of a tick and apply changes only between ticks.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::zone::SplitDistance;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_walk_speed() -> f64 {
    0.15
}
const fn default_gallop_breakpoint() -> f64 {
    0.6
}
const fn default_body_height() -> f64 {
    1.1
}
const fn default_stationary_trigger_zone() -> SplitDistance {
    SplitDistance::new(0.25, 0.5)
}
const fn default_walking_trigger_zone() -> SplitDistance {
    SplitDistance::new(0.8, 0.5)
}
const fn default_comfort_zone() -> SplitDistance {
    SplitDistance::new(1.2, 1.5)
}
const fn default_leg_move_speed() -> f64 {
    0.55
}
const fn default_leg_lift_height() -> f64 {
    0.35
}
const fn default_leg_drop_distance() -> f64 {
    0.3
}
const fn default_leg_look_ahead_fraction() -> f64 {
    0.6
}
const fn default_true() -> bool {
    true
}
const fn default_leg_scan_height_bias() -> f64 {
    0.5
}
const fn default_stabilization_factor() -> f64 {
    0.7
}
const fn default_body_height_correction_factor() -> f64 {
    0.25
}
const fn default_body_height_correction_acceleration() -> f64 {
    0.08
}
const fn default_gravity_acceleration() -> f64 {
    0.08
}
const fn default_air_drag_coefficient() -> f64 {
    0.02
}
const fn default_ground_drag_coefficient() -> f64 {
    0.2
}
const fn default_bounce_factor() -> f64 {
    0.5
}

// ---------------------------------------------------------------------------
// GaitConfig
// ---------------------------------------------------------------------------

/// Gait parameters for a creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaitConfig {
    /// Nominal horizontal walking speed, used to normalize the trigger-zone
    /// blend fraction.
    #[serde(default = "default_walk_speed")]
    pub walk_speed: f64,

    /// Fraction of `walk_speed` (capped at 1) above which the creature is
    /// considered at full stride for trigger-zone widening.
    #[serde(default = "default_gallop_breakpoint")]
    pub gallop_breakpoint: f64,

    /// Use the gallop gait policy instead of walk.
    #[serde(default)]
    pub gallop: bool,

    /// Preferred height of the body above the average foot target.
    #[serde(default = "default_body_height")]
    pub body_height: f64,

    /// Trigger zone while standing still.
    #[serde(default = "default_stationary_trigger_zone")]
    pub stationary_trigger_zone: SplitDistance,

    /// Trigger zone at full walking speed.
    #[serde(default = "default_walking_trigger_zone")]
    pub walking_trigger_zone: SplitDistance,

    /// Hard tolerance region; a foot outside it must move regardless of the
    /// gait policy.
    #[serde(default = "default_comfort_zone")]
    pub comfort_zone: SplitDistance,

    /// Per-tick step size of a moving foot toward its target.
    #[serde(default = "default_leg_move_speed")]
    pub leg_move_speed: f64,

    /// Height above the target a moving foot is lifted to while in transit.
    #[serde(default = "default_leg_lift_height")]
    pub leg_lift_height: f64,

    /// Horizontal distance to the target below which a lifted foot is allowed
    /// to descend.
    #[serde(default = "default_leg_drop_distance")]
    pub leg_drop_distance: f64,

    /// How far ahead of the rest position to look for new footing, as a
    /// fraction of the trigger-zone radius.
    #[serde(default = "default_leg_look_ahead_fraction")]
    pub leg_look_ahead_fraction: f64,

    /// Scan a 3x3 grid of fallback rays when the primary ray misses the
    /// acceptance band.
    #[serde(default = "default_true")]
    pub leg_scan_alternative_ground: bool,

    /// Upward bias applied to the preferred candidate position when the block
    /// directly ahead is not passable (prefer stepping up onto obstacles).
    #[serde(default = "default_leg_scan_height_bias")]
    pub leg_scan_height_bias: f64,

    /// Per-tick exponential pull of the centre of mass toward the
    /// acceleration origin.
    #[serde(default = "default_stabilization_factor")]
    pub stabilization_factor: f64,

    /// Blend factor from current body height toward the preferred height.
    #[serde(default = "default_body_height_correction_factor")]
    pub body_height_correction_factor: f64,

    /// Maximum per-tick vertical correction at full ground contact.
    #[serde(default = "default_body_height_correction_acceleration")]
    pub body_height_correction_acceleration: f64,

    /// Downward acceleration applied to the body every tick.
    #[serde(default = "default_gravity_acceleration")]
    pub gravity_acceleration: f64,

    /// Multiplicative vertical velocity decay per tick, in [0, 1].
    #[serde(default = "default_air_drag_coefficient")]
    pub air_drag_coefficient: f64,

    /// Horizontal velocity retention while standing, scaled by the fraction
    /// of grounded legs, in [0, 1].
    #[serde(default = "default_ground_drag_coefficient")]
    pub ground_drag_coefficient: f64,

    /// Fraction of vertical velocity retained (inverted) on ground impact,
    /// in [0, 1].
    #[serde(default = "default_bounce_factor")]
    pub bounce_factor: f64,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            walk_speed: default_walk_speed(),
            gallop_breakpoint: default_gallop_breakpoint(),
            gallop: false,
            body_height: default_body_height(),
            stationary_trigger_zone: default_stationary_trigger_zone(),
            walking_trigger_zone: default_walking_trigger_zone(),
            comfort_zone: default_comfort_zone(),
            leg_move_speed: default_leg_move_speed(),
            leg_lift_height: default_leg_lift_height(),
            leg_drop_distance: default_leg_drop_distance(),
            leg_look_ahead_fraction: default_leg_look_ahead_fraction(),
            leg_scan_alternative_ground: true,
            leg_scan_height_bias: default_leg_scan_height_bias(),
            stabilization_factor: default_stabilization_factor(),
            body_height_correction_factor: default_body_height_correction_factor(),
            body_height_correction_acceleration: default_body_height_correction_acceleration(),
            gravity_acceleration: default_gravity_acceleration(),
            air_drag_coefficient: default_air_drag_coefficient(),
            ground_drag_coefficient: default_ground_drag_coefficient(),
            bounce_factor: default_bounce_factor(),
        }
    }
}

impl GaitConfig {
    /// Validate configuration. Returns `Err` on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
            if value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: format!("must be > 0, got {value}"),
                });
            }
            Ok(())
        }
        fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
            if value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: format!("must be >= 0, got {value}"),
                });
            }
            Ok(())
        }
        fn unit_interval(field: &str, value: f64) -> Result<(), ConfigError> {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.into(),
                    message: format!("must be in [0, 1], got {value}"),
                });
            }
            Ok(())
        }

        positive("walk_speed", self.walk_speed)?;
        positive("gallop_breakpoint", self.gallop_breakpoint)?;
        positive("body_height", self.body_height)?;
        positive("leg_move_speed", self.leg_move_speed)?;
        non_negative("leg_lift_height", self.leg_lift_height)?;
        non_negative("leg_drop_distance", self.leg_drop_distance)?;
        non_negative("leg_look_ahead_fraction", self.leg_look_ahead_fraction)?;
        non_negative("gravity_acceleration", self.gravity_acceleration)?;
        for (field, zone) in [
            ("stationary_trigger_zone", self.stationary_trigger_zone),
            ("walking_trigger_zone", self.walking_trigger_zone),
            ("comfort_zone", self.comfort_zone),
        ] {
            non_negative(field, zone.horizontal)?;
            non_negative(field, zone.vertical)?;
        }
        unit_interval("stabilization_factor", self.stabilization_factor)?;
        unit_interval(
            "body_height_correction_factor",
            self.body_height_correction_factor,
        )?;
        non_negative(
            "body_height_correction_acceleration",
            self.body_height_correction_acceleration,
        )?;
        unit_interval("air_drag_coefficient", self.air_drag_coefficient)?;
        unit_interval("ground_drag_coefficient", self.ground_drag_coefficient)?;
        unit_interval("bounce_factor", self.bounce_factor)?;
        Ok(())
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(GaitConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_non_positive_move_speed() {
        let config = GaitConfig {
            leg_move_speed: 0.0,
            ..GaitConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("leg_move_speed"));
    }

    #[test]
    fn rejects_negative_gravity() {
        let config = GaitConfig {
            gravity_acceleration: -0.1,
            ..GaitConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_drag_outside_unit_interval() {
        let config = GaitConfig {
            air_drag_coefficient: 1.5,
            ..GaitConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn toml_round_trip() {
        let config = GaitConfig {
            gallop: true,
            walk_speed: 0.2,
            ..GaitConfig::default()
        };
        let text = toml::to_string(&config).unwrap();
        let parsed: GaitConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn empty_toml_uses_defaults() {
        let parsed: GaitConfig = toml::from_str("").unwrap();
        assert_eq!(parsed, GaitConfig::default());
    }

    #[test]
    fn partial_toml_overrides_one_field() {
        let parsed: GaitConfig = toml::from_str("walk_speed = 0.3").unwrap();
        assert_eq!(parsed.walk_speed, 0.3);
        assert_eq!(parsed.body_height, GaitConfig::default().body_height);
    }
}
