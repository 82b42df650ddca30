// Main entry point - Dependency injection and server setup
use std::sync::Arc;

use biomarker_trajectory::application::subject_service::SubjectService;
use biomarker_trajectory::application::timegraph_service::TimegraphService;
use biomarker_trajectory::infrastructure::archive_repository::ArchiveRepository;
use biomarker_trajectory::infrastructure::config::{load_module_registry, load_service_config};
use biomarker_trajectory::infrastructure::report_index::SqliteReportIndex;
use biomarker_trajectory::infrastructure::report_store::FileReportStore;
use biomarker_trajectory::presentation::app_state::AppState;
use biomarker_trajectory::presentation::routes::{build_router, cors_layer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_service_config()?;
    let registry = load_module_registry(&config.storage.module_registry)?;

    // Create repositories (infrastructure layer)
    let archive = Arc::new(ArchiveRepository::new(config.storage.rawdata_root.clone()));
    let reports = Arc::new(FileReportStore::new(config.storage.reports_root.clone()));
    let index = Arc::new(SqliteReportIndex::new(&config.storage.database).await?);

    // Create services (application layer)
    let subject_service = SubjectService::new(archive.clone());
    let timegraph_service = TimegraphService::new(archive, reports, index);

    let state = Arc::new(AppState {
        subject_service,
        timegraph_service,
        registry,
    });

    // Build router (presentation layer)
    let router = build_router(state, cors_layer(&config.cors.allowed_origins)?);

    let addr = config.server.socket_addr()?;
    tracing::info!("Starting biomarker-trajectory service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
