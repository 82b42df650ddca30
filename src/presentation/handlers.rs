// HTTP request handlers
use crate::application::timegraph_service::{TimegraphRequest, TimegraphResponse};
use crate::domain::registry::ModuleRegistry;
use crate::domain::subject::Subject;
use crate::presentation::api_error::ApiError;
use crate::presentation::app_state::AppState;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Module and marker catalogue loaded at startup
pub async fn get_registry(State(state): State<Arc<AppState>>) -> Json<ModuleRegistry> {
    Json(state.registry.clone())
}

/// List subjects present in the measurement archive
pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Subject>>, ApiError> {
    let subjects = state.subject_service.list_subjects().await?;
    Ok(Json(subjects))
}

/// Compute, persist and return a trajectory for one marker
pub async fn post_timegraph(
    State(state): State<Arc<AppState>>,
    Json(body): Json<TimegraphRequest>,
) -> Result<Json<TimegraphResponse>, ApiError> {
    let response = state.timegraph_service.create_report(body).await?;
    Ok(Json(response))
}
