// Domain layer - Pure models and the trajectory math
pub mod error;
pub mod measurement;
pub mod polynomial;
pub mod registry;
pub mod report;
pub mod subject;
pub mod trajectory;
pub mod zone;
