// Timegraph service - Use case for computing and recording a marker trajectory
use crate::application::measurement_repository::{
    ArchiveError, MarkerKey, MeasurementRepository, ReportIndex, ReportRepository,
};
use crate::application::trajectory_computer::compute_trajectory;
use crate::domain::error::TrajectoryError;
use crate::domain::polynomial::FittingConfig;
use crate::domain::report::{report_id, Timeframe, TimegraphReport};
use crate::domain::trajectory::{FitMetadata, PointResult};
use crate::domain::zone::ZoneBoundaries;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct TimeframeRequest {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FittingRequest {
    pub polynomial_degree: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimegraphRequest {
    pub subject_id: String,
    pub module_id: String,
    pub marker_id: String,
    pub timeframe: TimeframeRequest,
    pub zone_boundaries: ZoneBoundaries,
    pub fitting: FittingRequest,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimegraphResponse {
    pub report_id: String,
    pub datapoints: Vec<PointResult>,
    pub fit_metadata: FitMetadata,
}

#[derive(Debug, Error)]
pub enum TimegraphError {
    #[error("invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("could not read datapoints: {0}")]
    Archive(#[from] ArchiveError),

    #[error("no datapoints found within the requested timeframe")]
    NoData,

    #[error("trajectory could not be computed: {0}")]
    Trajectory(#[from] TrajectoryError),

    #[error("report could not be saved: {0}")]
    Storage(#[source] anyhow::Error),
}

#[derive(Clone)]
pub struct TimegraphService {
    measurements: Arc<dyn MeasurementRepository>,
    reports: Arc<dyn ReportRepository>,
    index: Arc<dyn ReportIndex>,
}

impl TimegraphService {
    pub fn new(
        measurements: Arc<dyn MeasurementRepository>,
        reports: Arc<dyn ReportRepository>,
        index: Arc<dyn ReportIndex>,
    ) -> Self {
        Self {
            measurements,
            reports,
            index,
        }
    }

    pub async fn create_report(
        &self,
        request: TimegraphRequest,
    ) -> Result<TimegraphResponse, TimegraphError> {
        let from = parse_instant(&request.timeframe.start_time)?;
        let to = parse_instant(&request.timeframe.end_time)?;
        if from > to {
            return Err(TimegraphError::InvalidTimeframe(format!(
                "start {} is after end {}",
                request.timeframe.start_time, request.timeframe.end_time
            )));
        }

        // Reject bad parameters before touching the archive
        let fitting = FittingConfig::from_degree(request.fitting.polynomial_degree)?;
        request.zone_boundaries.validate()?;

        let key = MarkerKey::new(
            request.subject_id.clone(),
            request.module_id.clone(),
            request.marker_id.clone(),
        );
        let measurements = self.measurements.read_timeseries(&key, from, to).await?;
        if measurements.is_empty() {
            return Err(TimegraphError::NoData);
        }

        let result = compute_trajectory(&measurements, &request.zone_boundaries, &fitting)?;

        let requested_at = Utc::now();
        let report = TimegraphReport {
            report_id: report_id(&request.subject_id, requested_at, Uuid::new_v4()),
            subject_id: request.subject_id,
            module_id: request.module_id,
            marker_id: request.marker_id,
            requested_at,
            timeframe: Timeframe {
                from: request.timeframe.start_time,
                to: request.timeframe.end_time,
            },
            zone_boundaries: request.zone_boundaries,
            fitting,
            result,
        };

        self.reports
            .save_report(&report)
            .await
            .map_err(TimegraphError::Storage)?;
        self.index
            .record_report(&report)
            .await
            .map_err(TimegraphError::Storage)?;
        self.index
            .record_subject(&report.subject_id, requested_at)
            .await
            .map_err(TimegraphError::Storage)?;

        tracing::info!(
            report_id = %report.report_id,
            subject = %report.subject_id,
            marker = %report.marker_id,
            points = report.result.datapoints.len(),
            "timegraph report created"
        );

        Ok(TimegraphResponse {
            report_id: report.report_id,
            datapoints: report.result.datapoints,
            fit_metadata: report.result.fit_metadata,
        })
    }
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, TimegraphError> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| TimegraphError::InvalidTimeframe(format!("'{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measurement::Measurement;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct InMemoryMeasurements {
        series: HashMap<MarkerKey, Vec<Measurement>>,
    }

    #[async_trait]
    impl MeasurementRepository for InMemoryMeasurements {
        async fn list_subject_ids(&self) -> Result<Vec<String>, ArchiveError> {
            Ok(self.series.keys().map(|k| k.subject_id.clone()).collect())
        }

        async fn read_timeseries(
            &self,
            key: &MarkerKey,
            from: DateTime<Utc>,
            to: DateTime<Utc>,
        ) -> Result<Vec<Measurement>, ArchiveError> {
            let series = self.series.get(key).ok_or_else(|| ArchiveError::NotFound {
                subject_id: key.subject_id.clone(),
                module_id: key.module_id.clone(),
                marker_id: key.marker_id.clone(),
            })?;
            Ok(series
                .iter()
                .filter(|m| m.timestamp >= from && m.timestamp <= to)
                .cloned()
                .collect())
        }
    }

    #[derive(Default)]
    struct RecordingReports {
        saved: Mutex<Vec<TimegraphReport>>,
        indexed: Mutex<Vec<String>>,
        subjects: Mutex<Vec<(String, DateTime<Utc>)>>,
    }

    #[async_trait]
    impl ReportRepository for RecordingReports {
        async fn save_report(&self, report: &TimegraphReport) -> anyhow::Result<()> {
            self.saved.lock().unwrap().push(report.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl ReportIndex for RecordingReports {
        async fn record_report(&self, report: &TimegraphReport) -> anyhow::Result<()> {
            self.indexed.lock().unwrap().push(report.report_id.clone());
            Ok(())
        }

        async fn record_subject(&self, subject_id: &str, seen_at: DateTime<Utc>) -> anyhow::Result<()> {
            self.subjects
                .lock()
                .unwrap()
                .push((subject_id.to_string(), seen_at));
            Ok(())
        }
    }

    struct FailingReports;

    #[async_trait]
    impl ReportRepository for FailingReports {
        async fn save_report(&self, _report: &TimegraphReport) -> anyhow::Result<()> {
            anyhow::bail!("disk full")
        }
    }

    struct FailingIndex;

    #[async_trait]
    impl ReportIndex for FailingIndex {
        async fn record_report(&self, _report: &TimegraphReport) -> anyhow::Result<()> {
            anyhow::bail!("database is locked")
        }

        async fn record_subject(&self, _subject_id: &str, _seen_at: DateTime<Utc>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn service_with(reports: Arc<RecordingReports>) -> TimegraphService {
        TimegraphService::new(Arc::new(measurements()), reports.clone(), reports)
    }

    fn glucose_key() -> MarkerKey {
        MarkerKey::new("subject_001", "metabolic", "glucose")
    }

    fn measurements() -> InMemoryMeasurements {
        let t0 = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
        let values = [92.0, 96.0, 104.0, 111.0, 118.0];
        let series = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Measurement::new(t0 + Duration::days(i as i64), v))
            .collect();
        InMemoryMeasurements {
            series: HashMap::from([(glucose_key(), series)]),
        }
    }

    fn request(degree: i64) -> TimegraphRequest {
        TimegraphRequest {
            subject_id: "subject_001".to_string(),
            module_id: "metabolic".to_string(),
            marker_id: "glucose".to_string(),
            timeframe: TimeframeRequest {
                start_time: "2026-02-01T00:00:00Z".to_string(),
                end_time: "2026-03-01T00:00:00Z".to_string(),
            },
            zone_boundaries: ZoneBoundaries::new(70.0, 110.0, 0.1),
            fitting: FittingRequest {
                polynomial_degree: degree,
            },
        }
    }

    #[tokio::test]
    async fn test_create_report_persists_and_returns_result() {
        let reports = Arc::new(RecordingReports::default());
        let service = service_with(reports.clone());

        let response = service.create_report(request(1)).await.unwrap();
        assert_eq!(response.datapoints.len(), 5);
        assert!(response.report_id.starts_with("subject_001-"));
        assert_eq!(response.fit_metadata.polynomial_degree, 1);

        let saved = reports.saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].report_id, response.report_id);
        assert_eq!(saved[0].timeframe.from, "2026-02-01T00:00:00Z");
        assert_eq!(saved[0].result.datapoints, response.datapoints);

        assert_eq!(*reports.indexed.lock().unwrap(), vec![response.report_id.clone()]);
        let subjects = reports.subjects.lock().unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].0, "subject_001");
        assert_eq!(subjects[0].1, saved[0].requested_at);
    }

    #[tokio::test]
    async fn test_invalid_timestamp() {
        let service = service_with(Arc::new(RecordingReports::default()));
        let mut bad = request(1);
        bad.timeframe.start_time = "yesterday".to_string();
        let err = service.create_report(bad).await.unwrap_err();
        assert!(matches!(err, TimegraphError::InvalidTimeframe(_)));

        let mut reversed = request(1);
        reversed.timeframe.start_time = "2026-04-01T00:00:00Z".to_string();
        let err = service.create_report(reversed).await.unwrap_err();
        assert!(matches!(err, TimegraphError::InvalidTimeframe(_)));
    }

    #[tokio::test]
    async fn test_unknown_marker_is_not_found() {
        let service = service_with(Arc::new(RecordingReports::default()));
        let mut unknown = request(1);
        unknown.marker_id = "cortisol".to_string();
        let err = service.create_report(unknown).await.unwrap_err();
        assert!(matches!(err, TimegraphError::Archive(ArchiveError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_empty_window_is_no_data() {
        let service = service_with(Arc::new(RecordingReports::default()));
        let mut early = request(1);
        early.timeframe.start_time = "2025-01-01T00:00:00Z".to_string();
        early.timeframe.end_time = "2025-02-01T00:00:00Z".to_string();
        let err = service.create_report(early).await.unwrap_err();
        assert!(matches!(err, TimegraphError::NoData));
    }

    #[tokio::test]
    async fn test_trajectory_errors_are_not_persisted() {
        let reports = Arc::new(RecordingReports::default());
        let service = service_with(reports.clone());

        let err = service.create_report(request(5)).await.unwrap_err();
        assert!(matches!(
            err,
            TimegraphError::Trajectory(TrajectoryError::InsufficientData {
                required: 6,
                supplied: 5,
                ..
            })
        ));

        let err = service.create_report(request(-1)).await.unwrap_err();
        assert!(matches!(
            err,
            TimegraphError::Trajectory(TrajectoryError::NegativeDegree(-1))
        ));

        assert!(reports.saved.lock().unwrap().is_empty());
        assert!(reports.indexed.lock().unwrap().is_empty());
        assert!(reports.subjects.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces() {
        let index = Arc::new(RecordingReports::default());
        let service =
            TimegraphService::new(Arc::new(measurements()), Arc::new(FailingReports), index.clone());
        let err = service.create_report(request(1)).await.unwrap_err();
        assert!(matches!(err, TimegraphError::Storage(_)));
        assert!(err.to_string().contains("disk full"));
        assert!(index.indexed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_index_failure_surfaces() {
        let reports = Arc::new(RecordingReports::default());
        let service =
            TimegraphService::new(Arc::new(measurements()), reports.clone(), Arc::new(FailingIndex));
        let err = service.create_report(request(1)).await.unwrap_err();
        assert!(matches!(err, TimegraphError::Storage(_)));
        assert!(err.to_string().contains("database is locked"));
        assert_eq!(reports.saved.lock().unwrap().len(), 1);
    }
}
