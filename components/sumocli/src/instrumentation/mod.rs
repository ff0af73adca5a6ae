//! Logging setup

/// Subscriber and panic hook installation
pub mod tracing;
