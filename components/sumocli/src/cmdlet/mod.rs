//! Sumo Logic cli cmdlets

/// Back up and delete a collector source
pub mod delete_source;
