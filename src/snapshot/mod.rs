//! Schema Snapshot Module
//!
//! Serializes a declared schema into the versioned snapshot document the
//! migration differ consumes:
//! - Output document types
//! - Default value and sequence resolution
//! - Column, constraint, index and policy mapping
//! - Name registries that enforce PostgreSQL's uniqueness rules

pub mod builder;
pub mod casing;
pub mod column;
pub mod constraints;
pub mod policy;
pub mod registry;
pub mod resolver;
pub mod table;
pub mod types;
pub mod view;

pub use builder::{generate_snapshot, generate_snapshot_with_report, SnapshotReport};
pub use casing::Casing;
pub use types::*;
