// Errors raised by the trajectory computation
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrajectoryError {
    #[error("healthy band is degenerate: healthy_min ({healthy_min}) must be strictly below healthy_max ({healthy_max})")]
    DegenerateBand { healthy_min: f64, healthy_max: f64 },

    #[error("vulnerability margin must be a non-negative number, got {0}")]
    NegativeMargin(f64),

    #[error("polynomial degree must be non-negative, got {0}")]
    NegativeDegree(i64),

    #[error("a degree-{degree} polynomial requires at least {required} data points, but only {supplied} were provided")]
    InsufficientData {
        degree: usize,
        required: usize,
        supplied: usize,
    },

    #[error("a degree-{degree} polynomial requires at least {} distinct timestamps, but only {distinct} were provided", .degree + 1)]
    SingularFit { degree: usize, distinct: usize },

    #[error("measurement {index} has a non-finite value")]
    NonFiniteValue { index: usize },
}

impl TrajectoryError {
    /// True when the caller's parameters are at fault rather than the series.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DegenerateBand { .. } | Self::NegativeMargin(_) | Self::NegativeDegree(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message_names_counts() {
        let err = TrajectoryError::InsufficientData {
            degree: 2,
            required: 3,
            supplied: 2,
        };
        assert_eq!(
            err.to_string(),
            "a degree-2 polynomial requires at least 3 data points, but only 2 were provided"
        );
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_configuration_errors() {
        assert!(TrajectoryError::NegativeDegree(-1).is_configuration());
        assert!(
            TrajectoryError::DegenerateBand {
                healthy_min: 1.0,
                healthy_max: 1.0
            }
            .is_configuration()
        );
        let singular = TrajectoryError::SingularFit {
            degree: 1,
            distinct: 1,
        };
        assert!(!singular.is_configuration());
        assert!(singular.to_string().contains("at least 2 distinct timestamps"));
    }
}
