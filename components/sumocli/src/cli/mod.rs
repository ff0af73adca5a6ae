//! Command line interface

/// Flags and entry function
pub mod cli;
