/// Database connection and schema management
pub mod database;

/// Workflow seed data (statuses, transaction types) from config.toml
pub mod workflow;
