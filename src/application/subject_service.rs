// Subject service - Use case for listing subjects
use crate::application::measurement_repository::{ArchiveError, MeasurementRepository};
use crate::domain::subject::Subject;
use std::sync::Arc;

#[derive(Clone)]
pub struct SubjectService {
    repository: Arc<dyn MeasurementRepository>,
}

impl SubjectService {
    pub fn new(repository: Arc<dyn MeasurementRepository>) -> Self {
        Self { repository }
    }

    pub async fn list_subjects(&self) -> Result<Vec<Subject>, ArchiveError> {
        let ids = self.repository.list_subject_ids().await?;
        Ok(ids.into_iter().map(Subject::new).collect())
    }
}
