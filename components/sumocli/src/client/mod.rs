//! Sumo Logic REST API access

/// Authenticated API client
pub mod client;
/// Client error types
pub mod errors;
