// Trajectory classification and result models
use super::polynomial::Polynomial;
use super::zone::{NormalizationConstants, Zone};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Dead zone for derivative sign classification, in h/hour (and h/hour^2).
pub const DERIVATIVE_ZERO_THRESHOLD: f64 = 0.001;

/// Ternary sign of a derivative after the dead zone is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "i8")]
pub enum SignClass {
    Positive,
    Zero,
    Negative,
}

impl SignClass {
    pub const ALL: [SignClass; 3] = [SignClass::Positive, SignClass::Zero, SignClass::Negative];

    pub fn classify(value: f64) -> Self {
        if value > DERIVATIVE_ZERO_THRESHOLD {
            SignClass::Positive
        } else if value < -DERIVATIVE_ZERO_THRESHOLD {
            SignClass::Negative
        } else {
            SignClass::Zero
        }
    }

    pub fn as_i8(self) -> i8 {
        match self {
            SignClass::Positive => 1,
            SignClass::Zero => 0,
            SignClass::Negative => -1,
        }
    }

    /// 0, 1 or 2 in the order positive, zero, negative.
    fn ordinal(self) -> u8 {
        match self {
            SignClass::Positive => 0,
            SignClass::Zero => 1,
            SignClass::Negative => 2,
        }
    }

    fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }
}

impl From<SignClass> for i8 {
    fn from(sign: SignClass) -> i8 {
        sign.as_i8()
    }
}

fn zone_ordinal(zone: Zone) -> u8 {
    match zone {
        Zone::NonPathology => 0,
        Zone::Vulnerability => 1,
        Zone::Pathology => 2,
    }
}

/// One of the 27 combinations of zone, trend (f') and curvature (f'').
///
/// Numbered `1 + 9*zone + 3*trend + curvature`, with each axis ordered
/// healthy/improving/accelerating first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrajectoryState {
    pub zone: Zone,
    pub trend: SignClass,
    pub curvature: SignClass,
}

impl TrajectoryState {
    pub fn new(zone: Zone, trend: SignClass, curvature: SignClass) -> Self {
        Self {
            zone,
            trend,
            curvature,
        }
    }

    pub fn number(&self) -> u8 {
        let zone_offset = 9 * zone_ordinal(self.zone);
        let trend_offset = 3 * self.trend.ordinal();
        let curvature_index = self.curvature.ordinal() + 1;
        zone_offset + trend_offset + curvature_index
    }

    pub fn from_number(number: u8) -> Option<Self> {
        if !(1..=27).contains(&number) {
            return None;
        }
        let index = number - 1;
        Some(Self {
            zone: Zone::ALL[(index / 9) as usize],
            trend: SignClass::from_ordinal((index / 3) % 3)?,
            curvature: SignClass::from_ordinal(index % 3)?,
        })
    }
}

/// Rounds for presentation; classification always runs on unrounded values.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointResult {
    pub timestamp: DateTime<Utc>,
    pub x_hours: f64,
    pub raw_value: f64,
    pub data_quality: String,
    pub health_score: f64,
    pub fitted_value: f64,
    pub zone: Zone,
    pub f_prime: f64,
    pub f_double_prime: f64,
    pub f_prime_sign: SignClass,
    pub f_double_prime_sign: SignClass,
    pub trajectory_state: u8,
    pub time_to_transition_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneMargin {
    pub vulnerability_margin: f64,
}

/// Everything a renderer needs to redraw the fitted curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitMetadata {
    pub coefficients: Polynomial,
    #[serde(rename = "t0_iso")]
    pub t0: DateTime<Utc>,
    pub polynomial_degree: usize,
    pub normalization: NormalizationConstants,
    pub zone_boundaries: ZoneMargin,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryResult {
    pub datapoints: Vec<PointResult>,
    pub fit_metadata: FitMetadata,
}
