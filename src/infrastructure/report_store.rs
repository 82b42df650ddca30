// Filesystem report store: <root>/<subject>/<report_id>.json
use crate::application::measurement_repository::ReportRepository;
use crate::domain::report::TimegraphReport;
use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileReportStore {
    root: PathBuf,
}

impl FileReportStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn report_path(&self, report: &TimegraphReport) -> PathBuf {
        self.root
            .join(&report.subject_id)
            .join(format!("{}.json", report.report_id))
    }
}

#[async_trait]
impl ReportRepository for FileReportStore {
    async fn save_report(&self, report: &TimegraphReport) -> anyhow::Result<()> {
        let path = self.report_path(report);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("failed to create report directory {}", dir.display()))?;
        }

        let payload = serde_json::to_vec_pretty(report).context("failed to serialize report")?;
        tokio::fs::write(&path, payload)
            .await
            .with_context(|| format!("failed to write report {}", path.display()))?;

        tracing::debug!("Wrote report {}", path.display());
        Ok(())
    }
}
