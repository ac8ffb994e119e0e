//! pgsnap - PostgreSQL schema snapshots
//!
//! Converts a declared database schema ([`models::SchemaObjectGraph`]) into a
//! normalized, versioned JSON [`snapshot::Snapshot`] that a migration differ
//! can compare against a previous one. The same snapshot can be taken from a
//! plain SQL dump by materializing it in a scratch PostgreSQL database and
//! introspecting the catalog.
//!
//! ```no_run
//! use pgsnap::{generate_snapshot, SchemaObjectGraph, SnapshotConfig};
//!
//! let graph = SchemaObjectGraph::from_json(r#"{"tables": [{"name": "users"}]}"#)?;
//! let snapshot = generate_snapshot(&graph, &SnapshotConfig::default())?;
//! println!("{}", snapshot.to_json_pretty()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod ingest;
pub mod models;
pub mod snapshot;

#[cfg(feature = "postgres-engine")]
pub mod introspection;

pub use config::{EngineConfig, Settings, SnapshotConfig};
pub use error::{IngestError, SnapshotError, SnapshotResult};
pub use ingest::{SqlDumpImporter, UnavailableEngineProvider};
pub use models::SchemaObjectGraph;
pub use snapshot::{generate_snapshot, generate_snapshot_with_report, Casing, Snapshot, SnapshotReport};

#[cfg(feature = "postgres-engine")]
pub use ingest::PostgresEngineProvider;
#[cfg(feature = "postgres-engine")]
pub use introspection::PgCatalogIntrospector;
