use thiserror::Error;

/// Top-level error type for strider-core.
#[derive(Debug, Error)]
pub enum StriderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Body plan error: {0}")]
    Plan(#[from] PlanError),
}

/// Gait configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

/// Body plan validation errors.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Body plan has no legs")]
    NoLegs,

    #[error("Leg {leg} has no segments")]
    NoSegments { leg: usize },

    #[error("Leg {leg} segment {segment} has non-positive length: {length}")]
    NonPositiveSegmentLength {
        leg: usize,
        segment: usize,
        length: f64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strider_error_from_config_error() {
        let err = ConfigError::InvalidValue {
            field: "walk_speed".into(),
            message: "must be > 0".into(),
        };
        let top: StriderError = err.into();
        assert!(matches!(top, StriderError::Config(_)));
        assert!(top.to_string().contains("walk_speed"));
    }

    #[test]
    fn strider_error_from_plan_error() {
        let top: StriderError = PlanError::NoLegs.into();
        assert!(matches!(top, StriderError::Plan(_)));
        assert_eq!(top.to_string(), "Body plan error: Body plan has no legs");
    }

    #[test]
    fn plan_error_display_messages() {
        assert_eq!(
            PlanError::NoSegments { leg: 2 }.to_string(),
            "Leg 2 has no segments"
        );
        assert_eq!(
            PlanError::NonPositiveSegmentLength {
                leg: 0,
                segment: 1,
                length: -0.5
            }
            .to_string(),
            "Leg 0 segment 1 has non-positive length: -0.5"
        );
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
