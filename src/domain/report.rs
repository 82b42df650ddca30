// Timegraph report domain model
use super::polynomial::FittingConfig;
use super::trajectory::TrajectoryResult;
use super::zone::ZoneBoundaries;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Requested window, kept exactly as the client sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeframe {
    pub from: String,
    pub to: String,
}

/// A computed trajectory together with every input needed to reproduce it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimegraphReport {
    pub report_id: String,
    pub subject_id: String,
    pub module_id: String,
    pub marker_id: String,
    pub requested_at: DateTime<Utc>,
    pub timeframe: Timeframe,
    pub zone_boundaries: ZoneBoundaries,
    pub fitting: FittingConfig,
    pub result: TrajectoryResult,
}

/// `<subject>-<YYYY-MM-DD>-<8 hex chars>`, e.g. `subject_001-2026-02-23-550e8400`.
pub fn report_id(subject_id: &str, requested_at: DateTime<Utc>, nonce: Uuid) -> String {
    let short = nonce.simple().to_string();
    format!(
        "{}-{}-{}",
        subject_id,
        requested_at.format("%Y-%m-%d"),
        &short[..8]
    )
}
