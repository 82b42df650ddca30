// Trajectory computation - normalize, fit, classify and predict zone transitions.
// Pure: no I/O, no shared state, safe to call from any number of threads.
use crate::domain::error::TrajectoryError;
use crate::domain::measurement::Measurement;
use crate::domain::polynomial::{FittingConfig, Polynomial};
use crate::domain::trajectory::{
    round_to, FitMetadata, PointResult, SignClass, TrajectoryResult, TrajectoryState, ZoneMargin,
};
use crate::domain::zone::ZoneBoundaries;

/// Roots with an imaginary part above this are not physical crossings.
pub const IMAGINARY_TOLERANCE: f64 = 1e-6;

const VALUE_DECIMALS: i32 = 6;
const TRANSITION_DECIMALS: i32 = 4;

/// Runs the full transform over a chronologically sorted series.
pub fn compute_trajectory(
    measurements: &[Measurement],
    boundaries: &ZoneBoundaries,
    fitting: &FittingConfig,
) -> Result<TrajectoryResult, TrajectoryError> {
    let normalization = boundaries.normalization()?;

    let degree = fitting.polynomial_degree;
    let required = fitting.required_points();
    if measurements.len() < required {
        return Err(TrajectoryError::InsufficientData {
            degree,
            required,
            supplied: measurements.len(),
        });
    }
    if let Some(index) = measurements.iter().position(|m| !m.value.is_finite()) {
        return Err(TrajectoryError::NonFiniteValue { index });
    }

    let t0 = measurements[0].timestamp;
    let x_hours: Vec<f64> = measurements.iter().map(|m| m.hours_since(t0)).collect();
    let span = x_hours.iter().fold(0.0_f64, |m, &x| m.max(x));
    let scores: Vec<f64> = measurements
        .iter()
        .map(|m| normalization.health_score(m.value))
        .collect();

    let fitted = Polynomial::fit(&x_hours, &scores, degree).map_err(|_| {
        TrajectoryError::SingularFit {
            degree,
            distinct: count_distinct(&x_hours),
        }
    })?;
    let slope = fitted.derivative();
    let curvature = slope.derivative();

    tracing::debug!(
        points = measurements.len(),
        degree,
        coefficients = ?fitted.coefficients(),
        "fitted health-score polynomial"
    );

    let datapoints = measurements
        .iter()
        .zip(x_hours.iter().zip(&scores))
        .map(|(measurement, (&x, &health_score))| {
            let fitted_value = fitted.eval(x);
            let f_prime = slope.eval(x);
            let f_double_prime = curvature.eval(x);

            let zone = boundaries.classify(health_score);
            let f_prime_sign = SignClass::classify(f_prime);
            let f_double_prime_sign = SignClass::classify(f_double_prime);
            let state = TrajectoryState::new(zone, f_prime_sign, f_double_prime_sign);

            let transition = time_to_transition(&fitted, boundaries, x, span);

            PointResult {
                timestamp: measurement.timestamp,
                x_hours: round_to(x, VALUE_DECIMALS),
                raw_value: measurement.value,
                data_quality: measurement.data_quality.clone(),
                health_score: round_to(health_score, VALUE_DECIMALS),
                fitted_value: round_to(fitted_value, VALUE_DECIMALS),
                zone,
                f_prime: round_to(f_prime, VALUE_DECIMALS),
                f_double_prime: round_to(f_double_prime, VALUE_DECIMALS),
                f_prime_sign,
                f_double_prime_sign,
                trajectory_state: state.number(),
                time_to_transition_hours: transition.map(|t| round_to(t, TRANSITION_DECIMALS)),
            }
        })
        .collect();

    Ok(TrajectoryResult {
        datapoints,
        fit_metadata: FitMetadata {
            coefficients: fitted,
            t0,
            polynomial_degree: degree,
            normalization,
            zone_boundaries: ZoneMargin {
                vulnerability_margin: boundaries.vulnerability_margin,
            },
        },
    })
}

/// Hours from `x_current` until the fitted curve next crosses any zone boundary.
///
/// `span` is the largest elapsed hour of the fit; see [`Polynomial::roots_minus`].
pub fn time_to_transition(
    fitted: &Polynomial,
    boundaries: &ZoneBoundaries,
    x_current: f64,
    span: f64,
) -> Option<f64> {
    boundaries
        .score_boundaries()
        .iter()
        .flat_map(|&boundary| fitted.roots_minus(boundary, span))
        .filter(|root| root.im.abs() <= IMAGINARY_TOLERANCE)
        .map(|root| root.re)
        .filter(|&t| t > x_current)
        .min_by(f64::total_cmp)
        .map(|t| t - x_current)
}

fn count_distinct(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}
