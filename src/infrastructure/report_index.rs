// SQLite index of generated reports and known subjects
use crate::application::measurement_repository::ReportIndex;
use crate::domain::report::TimegraphReport;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SqliteReportIndex {
    pool: SqlitePool,
}

impl SqliteReportIndex {
    /// Opens (or creates) the database file and makes sure both tables exist.
    pub async fn new(db_path: &Path) -> anyhow::Result<Self> {
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create database directory {}", dir.display()))?;
        }

        let connection_options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10))
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .connect_with(connection_options)
            .await
            .with_context(|| format!("failed to open report database {}", db_path.display()))?;

        let index = Self { pool };
        index.initialize().await?;
        Ok(index)
    }

    async fn initialize(&self) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS subjects (
                id          INTEGER PRIMARY KEY,
                subject_id  TEXT NOT NULL UNIQUE,
                created_at  TEXT NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .context("failed to create subjects table")?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS timegraph_reports (
                report_id             TEXT PRIMARY KEY,
                subject_id            TEXT NOT NULL,
                marker_id             TEXT NOT NULL,
                module_id             TEXT NOT NULL,
                requested_at          TEXT NOT NULL,
                timeframe_from        TEXT NOT NULL,
                timeframe_to          TEXT NOT NULL,
                polynomial_degree     INTEGER NOT NULL,
                healthy_min           REAL NOT NULL,
                healthy_max           REAL NOT NULL,
                vulnerability_margin  REAL NOT NULL
            );",
        )
        .execute(&self.pool)
        .await
        .context("failed to create timegraph_reports table")?;

        Ok(())
    }

    /// Report ids for one subject, oldest request first.
    pub async fn report_ids_for_subject(&self, subject_id: &str) -> anyhow::Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT report_id FROM timegraph_reports WHERE subject_id = ? ORDER BY requested_at, report_id",
        )
        .bind(subject_id)
        .fetch_all(&self.pool)
        .await
        .context("failed to query timegraph_reports")?;

        Ok(rows.iter().map(|row| row.get("report_id")).collect())
    }
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[async_trait]
impl ReportIndex for SqliteReportIndex {
    async fn record_report(&self, report: &TimegraphReport) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO timegraph_reports (
                report_id, subject_id, marker_id, module_id, requested_at,
                timeframe_from, timeframe_to, polynomial_degree,
                healthy_min, healthy_max, vulnerability_margin
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&report.report_id)
        .bind(&report.subject_id)
        .bind(&report.marker_id)
        .bind(&report.module_id)
        .bind(iso(report.requested_at))
        .bind(&report.timeframe.from)
        .bind(&report.timeframe.to)
        .bind(report.fitting.polynomial_degree as i64)
        .bind(report.zone_boundaries.healthy_min)
        .bind(report.zone_boundaries.healthy_max)
        .bind(report.zone_boundaries.vulnerability_margin)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to index report {}", report.report_id))?;

        tracing::debug!("Indexed report {}", report.report_id);
        Ok(())
    }

    async fn record_subject(&self, subject_id: &str, seen_at: DateTime<Utc>) -> anyhow::Result<()> {
        sqlx::query("INSERT OR IGNORE INTO subjects (subject_id, created_at) VALUES (?, ?)")
            .bind(subject_id)
            .bind(iso(seen_at))
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to record subject {}", subject_id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::trajectory_computer::compute_trajectory;
    use crate::domain::measurement::Measurement;
    use crate::domain::polynomial::FittingConfig;
    use crate::domain::report::Timeframe;
    use crate::domain::zone::ZoneBoundaries;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn temp_db_dir() -> PathBuf {
        std::env::temp_dir().join(format!("trajectory-index-{}", uuid::Uuid::new_v4()))
    }

    fn report(report_id: &str, requested_at: DateTime<Utc>) -> TimegraphReport {
        let measurements: Vec<Measurement> = [140.0, 138.0, 133.0]
            .iter()
            .enumerate()
            .map(|(i, &v)| Measurement::new(requested_at - chrono::Duration::days(3 - i as i64), v))
            .collect();
        let zone_boundaries = ZoneBoundaries::new(135.0, 145.0, 0.2);
        let fitting = FittingConfig::new(1);
        TimegraphReport {
            report_id: report_id.to_string(),
            subject_id: "subject_003".to_string(),
            module_id: "renal".to_string(),
            marker_id: "sodium".to_string(),
            requested_at,
            timeframe: Timeframe {
                from: "2026-05-01T00:00:00Z".to_string(),
                to: "2026-05-31T00:00:00Z".to_string(),
            },
            zone_boundaries,
            fitting,
            result: compute_trajectory(&measurements, &zone_boundaries, &fitting).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_record_report_and_subject_rows() {
        let dir = temp_db_dir();
        let db_path = dir.join("nested").join("trajectory.db");
        let index = SqliteReportIndex::new(&db_path).await.unwrap();
        assert!(db_path.exists());

        let requested_at = Utc.with_ymd_and_hms(2026, 5, 20, 14, 30, 0).unwrap();
        index
            .record_report(&report("subject_003-2026-05-20-1a2b3c4d", requested_at))
            .await
            .unwrap();
        index.record_subject("subject_003", requested_at).await.unwrap();
        index
            .record_subject("subject_003", requested_at + chrono::Duration::days(1))
            .await
            .unwrap();

        let row = sqlx::query("SELECT * FROM timegraph_reports WHERE report_id = ?")
            .bind("subject_003-2026-05-20-1a2b3c4d")
            .fetch_one(&index.pool)
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("subject_id"), "subject_003");
        assert_eq!(row.get::<String, _>("module_id"), "renal");
        assert_eq!(row.get::<String, _>("marker_id"), "sodium");
        assert_eq!(row.get::<String, _>("requested_at"), "2026-05-20T14:30:00Z");
        assert_eq!(row.get::<String, _>("timeframe_from"), "2026-05-01T00:00:00Z");
        assert_eq!(row.get::<String, _>("timeframe_to"), "2026-05-31T00:00:00Z");
        assert_eq!(row.get::<i64, _>("polynomial_degree"), 1);
        assert_eq!(row.get::<f64, _>("healthy_min"), 135.0);
        assert_eq!(row.get::<f64, _>("healthy_max"), 145.0);
        assert_eq!(row.get::<f64, _>("vulnerability_margin"), 0.2);

        // The second sighting of a known subject is ignored.
        let subjects = sqlx::query("SELECT subject_id, created_at FROM subjects")
            .fetch_all(&index.pool)
            .await
            .unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].get::<String, _>("created_at"), "2026-05-20T14:30:00Z");

        index.pool.close().await;
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_reopen_keeps_rows_and_rejects_duplicate_report() {
        let dir = temp_db_dir();
        let db_path = dir.join("trajectory.db");
        let first_at = Utc.with_ymd_and_hms(2026, 5, 20, 9, 0, 0).unwrap();
        let second_at = Utc.with_ymd_and_hms(2026, 5, 21, 9, 0, 0).unwrap();

        let index = SqliteReportIndex::new(&db_path).await.unwrap();
        index.record_report(&report("subject_003-b", second_at)).await.unwrap();
        index.pool.close().await;

        let reopened = SqliteReportIndex::new(&db_path).await.unwrap();
        reopened.record_report(&report("subject_003-a", first_at)).await.unwrap();
        assert!(reopened.record_report(&report("subject_003-a", first_at)).await.is_err());

        let ids = reopened.report_ids_for_subject("subject_003").await.unwrap();
        assert_eq!(ids, vec!["subject_003-a", "subject_003-b"]);
        assert!(reopened.report_ids_for_subject("subject_999").await.unwrap().is_empty());

        reopened.pool.close().await;
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
