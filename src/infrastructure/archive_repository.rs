// Filesystem measurement archive: <root>/<subject>/<module>/<marker>/index.json + one JSON file per reading
use crate::application::measurement_repository::{ArchiveError, MarkerKey, MeasurementRepository};
use crate::domain::measurement::Measurement;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ArchiveRepository {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct MarkerIndex {
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    timestamp: String,
    file: String,
}

impl ArchiveRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn marker_dir(&self, key: &MarkerKey) -> Result<PathBuf, ArchiveError> {
        for id in [&key.subject_id, &key.module_id, &key.marker_id] {
            if !is_plain_name(id) {
                return Err(ArchiveError::InvalidIdentifier(id.clone()));
            }
        }
        Ok(self
            .root
            .join(&key.subject_id)
            .join(&key.module_id)
            .join(&key.marker_id))
    }

    async fn read_index(&self, key: &MarkerKey, marker_dir: &Path) -> Result<MarkerIndex, ArchiveError> {
        let index_path = marker_dir.join("index.json");
        let raw = match tokio::fs::read_to_string(&index_path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ArchiveError::NotFound {
                    subject_id: key.subject_id.clone(),
                    module_id: key.module_id.clone(),
                    marker_id: key.marker_id.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&raw)
            .map_err(|e| ArchiveError::Malformed(format!("{}: {}", index_path.display(), e)))
    }

    /// Reads one reading file; missing or corrupt files are skipped, not fatal.
    async fn read_measurement(&self, path: &Path) -> Result<Option<Measurement>, ArchiveError> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!("Skipping data point file '{}': not found", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str::<Measurement>(&raw) {
            Ok(measurement) => Ok(Some(measurement)),
            Err(e) => {
                tracing::warn!("Skipping data point file '{}': {}", path.display(), e);
                Ok(None)
            }
        }
    }
}

/// A single path component: no separators, no `.`/`..`, not empty.
fn is_plain_name(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

#[async_trait]
impl MeasurementRepository for ArchiveRepository {
    async fn list_subject_ids(&self) -> Result<Vec<String>, ArchiveError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    ids.push(name.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    async fn read_timeseries(
        &self,
        key: &MarkerKey,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Measurement>, ArchiveError> {
        let marker_dir = self.marker_dir(key)?;
        let index = self.read_index(key, &marker_dir).await?;
        let indexed = index.entries.len();

        let mut measurements = Vec::new();
        for entry in index.entries {
            let entry_time = match DateTime::parse_from_rfc3339(&entry.timestamp) {
                Ok(t) => t.with_timezone(&Utc),
                Err(e) => {
                    tracing::warn!("Skipping index entry '{}': bad timestamp: {}", entry.file, e);
                    continue;
                }
            };
            if entry_time < from || entry_time > to {
                continue;
            }
            if !is_plain_name(&entry.file) {
                tracing::warn!("Skipping index entry '{}': not a plain file name", entry.file);
                continue;
            }
            if let Some(measurement) = self.read_measurement(&marker_dir.join(&entry.file)).await? {
                measurements.push(measurement);
            }
        }

        measurements.sort_by_key(|m| m.timestamp);

        tracing::debug!(
            "Read {} of {} indexed points for {}/{}/{}",
            measurements.len(),
            indexed,
            key.subject_id,
            key.module_id,
            key.marker_id
        );
        Ok(measurements)
    }
}
