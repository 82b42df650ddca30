// Measurement domain model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_DATA_QUALITY: &str = "good";

fn default_data_quality() -> String {
    DEFAULT_DATA_QUALITY.to_string()
}

/// A single timestamped reading of a scalar biomarker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(default = "default_data_quality")]
    pub data_quality: String,
}

impl Measurement {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            data_quality: default_data_quality(),
        }
    }

    pub fn with_quality(mut self, data_quality: impl Into<String>) -> Self {
        self.data_quality = data_quality.into();
        self
    }

    /// Hours elapsed since `origin`, as a float.
    pub fn hours_since(&self, origin: DateTime<Utc>) -> f64 {
        let delta = self.timestamp - origin;
        match delta.num_microseconds() {
            Some(us) => us as f64 / 3_600_000_000.0,
            None => delta.num_milliseconds() as f64 / 3_600_000.0,
        }
    }
}
