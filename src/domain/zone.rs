// Health zones and raw-value normalization
use super::error::TrajectoryError;
use serde::{Deserialize, Serialize};

/// Healthy band of a marker plus the half-width of the vulnerability band around h = 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBoundaries {
    pub healthy_min: f64,
    pub healthy_max: f64,
    pub vulnerability_margin: f64,
}

impl ZoneBoundaries {
    pub fn new(healthy_min: f64, healthy_max: f64, vulnerability_margin: f64) -> Self {
        Self {
            healthy_min,
            healthy_max,
            vulnerability_margin,
        }
    }

    pub fn validate(&self) -> Result<(), TrajectoryError> {
        let band_ok = self.healthy_min.is_finite()
            && self.healthy_max.is_finite()
            && self.healthy_min < self.healthy_max;
        if !band_ok {
            return Err(TrajectoryError::DegenerateBand {
                healthy_min: self.healthy_min,
                healthy_max: self.healthy_max,
            });
        }
        if !(self.vulnerability_margin.is_finite() && self.vulnerability_margin >= 0.0) {
            return Err(TrajectoryError::NegativeMargin(self.vulnerability_margin));
        }
        Ok(())
    }

    /// Derives the normalization constants, rejecting an unusable band.
    pub fn normalization(&self) -> Result<NormalizationConstants, TrajectoryError> {
        self.validate()?;
        Ok(NormalizationConstants {
            healthy_min: self.healthy_min,
            healthy_max: self.healthy_max,
            mid: (self.healthy_min + self.healthy_max) / 2.0,
            half_range: (self.healthy_max - self.healthy_min) / 2.0,
        })
    }

    /// Zone boundaries in health-score space, upper first.
    pub fn score_boundaries(&self) -> [f64; 3] {
        [self.vulnerability_margin, 0.0, -self.vulnerability_margin]
    }

    pub fn classify(&self, health_score: f64) -> Zone {
        if health_score > self.vulnerability_margin {
            Zone::NonPathology
        } else if health_score < -self.vulnerability_margin {
            Zone::Pathology
        } else {
            Zone::Vulnerability
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizationConstants {
    pub healthy_min: f64,
    pub healthy_max: f64,
    pub mid: f64,
    pub half_range: f64,
}

impl NormalizationConstants {
    pub fn health_score(&self, raw: f64) -> f64 {
        normalize(raw, self.mid, self.half_range)
    }
}

/// Distance-from-centre transform: 1.0 at `mid`, 0.0 at either healthy edge, negative outside.
pub fn normalize(raw: f64, mid: f64, half_range: f64) -> f64 {
    1.0 - (raw - mid).abs() / half_range
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    NonPathology,
    Vulnerability,
    Pathology,
}

impl Zone {
    pub const ALL: [Zone; 3] = [Zone::NonPathology, Zone::Vulnerability, Zone::Pathology];

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::NonPathology => "non_pathology",
            Zone::Vulnerability => "vulnerability",
            Zone::Pathology => "pathology",
        }
    }
}
