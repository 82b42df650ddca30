// Infrastructure layer - External dependencies and adapters
pub mod archive_repository;
pub mod config;
pub mod report_index;
pub mod report_store;
