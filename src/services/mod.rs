pub mod health_service;
pub mod schema_store;
