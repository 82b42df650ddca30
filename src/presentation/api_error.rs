// Maps service errors onto HTTP responses with a `{"detail": ...}` body
use crate::application::measurement_repository::ArchiveError;
use crate::application::timegraph_service::TimegraphError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }
}

fn archive_status(err: &ArchiveError) -> StatusCode {
    match err {
        ArchiveError::NotFound { .. } => StatusCode::NOT_FOUND,
        ArchiveError::InvalidIdentifier(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ArchiveError::Io(_) | ArchiveError::Malformed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ArchiveError> for ApiError {
    fn from(err: ArchiveError) -> Self {
        Self::new(archive_status(&err), err.to_string())
    }
}

impl From<TimegraphError> for ApiError {
    fn from(err: TimegraphError) -> Self {
        let status = match &err {
            TimegraphError::InvalidTimeframe(_) | TimegraphError::Trajectory(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            TimegraphError::NoData => StatusCode::NOT_FOUND,
            TimegraphError::Archive(archive) => archive_status(archive),
            TimegraphError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.detail);
        } else {
            tracing::debug!(status = %self.status, "{}", self.detail);
        }
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
