//! Configuration and backup helpers

/// Backup record and writer
pub mod backup;
/// Layered configuration loader
pub mod load_config;
