// Application state for HTTP handlers
use crate::application::subject_service::SubjectService;
use crate::application::timegraph_service::TimegraphService;
use crate::domain::registry::ModuleRegistry;

#[derive(Clone)]
pub struct AppState {
    pub subject_service: SubjectService,
    pub timegraph_service: TimegraphService,
    pub registry: ModuleRegistry,
}
