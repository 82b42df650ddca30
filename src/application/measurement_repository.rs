// Repository traits for reading measurements and persisting reports
use crate::domain::measurement::Measurement;
use crate::domain::report::TimegraphReport;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Identifies one marker series in the archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MarkerKey {
    pub subject_id: String,
    pub module_id: String,
    pub marker_id: String,
}

impl MarkerKey {
    pub fn new(
        subject_id: impl Into<String>,
        module_id: impl Into<String>,
        marker_id: impl Into<String>,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            module_id: module_id.into(),
            marker_id: marker_id.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("no measurement index found for {subject_id}/{module_id}/{marker_id}")]
    NotFound {
        subject_id: String,
        module_id: String,
        marker_id: String,
    },

    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("failed to read measurement archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed measurement index: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait MeasurementRepository: Send + Sync {
    /// List all subject ids that have archived data
    async fn list_subject_ids(&self) -> Result<Vec<String>, ArchiveError>;

    /// Measurements for one marker within `[from, to]`, sorted chronologically
    async fn read_timeseries(
        &self,
        key: &MarkerKey,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Measurement>, ArchiveError>;
}

#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn save_report(&self, report: &TimegraphReport) -> anyhow::Result<()>;
}

/// Queryable index of generated reports and the subjects they belong to.
#[async_trait]
pub trait ReportIndex: Send + Sync {
    async fn record_report(&self, report: &TimegraphReport) -> anyhow::Result<()>;

    /// Registers the subject if it is not already known.
    async fn record_subject(&self, subject_id: &str, seen_at: DateTime<Utc>) -> anyhow::Result<()>;
}
