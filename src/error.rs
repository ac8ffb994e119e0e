//! Error handling module
//!
//! Every fatal condition of a conversion is a [`SnapshotError`]; the first one
//! aborts the whole conversion and no partial snapshot is ever returned.
//! SQL-dump ingestion wraps those in [`IngestError`].

use thiserror::Error;

/// Fatal snapshot generation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error(
        "Duplicated unique constraint names in {table} table. The unique constraint {name} \
         on the {columns} column(s) is conflicting with a unique constraint name already \
         defined for {existing_columns} column(s)"
    )]
    DuplicateUniqueConstraint {
        table: String,
        name: String,
        columns: String,
        existing_columns: String,
    },

    #[error(
        "Duplicated index name {name} across {schema} schema. Please rename your index in \
         either the {table} table or the table with the duplicated index name"
    )]
    DuplicateIndexName {
        schema: String,
        table: String,
        name: String,
    },

    #[error(
        "Duplicated check constraint name {name} across {schema} schema in {table}. Please \
         rename your check constraint"
    )]
    DuplicateCheckConstraintName {
        schema: String,
        table: String,
        name: String,
    },

    #[error(
        "Duplicated policy name {name}: already declared on {existing_owner}, declared again \
         on {owner}. Please rename one of the policies"
    )]
    DuplicatePolicyName {
        name: String,
        owner: String,
        existing_owner: String,
    },

    #[error("Duplicated view name {name} across {schema} schema. Please rename your view")]
    DuplicateViewName { schema: String, name: String },

    #[error(
        "Please specify an index name in {table} table that has \"{expression}\" expression. \
         Index names can only be generated for indexes on columns"
    )]
    MissingIndexName { table: String, expression: String },

    #[error(
        "Index on the {column} column inside the {table} table uses the vector type without \
         an operator class. Vector indexes have no default operator class, pick one of: \
         {available}"
    )]
    MissingOperatorClass {
        table: String,
        column: String,
        available: String,
    },
}

/// Errors of the SQL-dump ingestion path
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Statement {index} failed: {message}")]
    Statement { index: usize, message: String },

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Introspection failed: {0}")]
    Introspection(String),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[cfg(feature = "postgres-engine")]
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),
}

/// Result type alias for snapshot generation
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Helper function to create a dependency-unavailable error
pub fn dependency_unavailable(msg: impl Into<String>) -> IngestError {
    IngestError::DependencyUnavailable(msg.into())
}
