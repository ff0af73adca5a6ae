//! Cmdlet runtime setup

/// Client construction and cmdlet dispatch
pub mod runtime;
