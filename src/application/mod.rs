// Application layer - Use cases and repository contracts
pub mod measurement_repository;
pub mod subject_service;
pub mod timegraph_service;
pub mod trajectory_computer;
