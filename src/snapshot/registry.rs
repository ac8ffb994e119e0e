//! Name registries
//!
//! PostgreSQL requires some names to be unique beyond the object that
//! declares them. Each registry remembers the names seen so far in one
//! conversion and reports the first collision.

use crate::error::{SnapshotError, SnapshotResult};
use std::collections::{HashMap, HashSet};

/// Unique constraint names of one table (column-level and table-level)
#[derive(Debug, Default)]
pub struct UniqueRegistry {
    table: String,
    names: HashMap<String, Vec<String>>,
}

impl UniqueRegistry {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            names: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, columns: &[String]) -> SnapshotResult<()> {
        if let Some(existing) = self.names.get(name) {
            return Err(SnapshotError::DuplicateUniqueConstraint {
                table: self.table.clone(),
                name: name.to_string(),
                columns: columns.join(","),
                existing_columns: existing.join(","),
            });
        }
        self.names.insert(name.to_string(), columns.to_vec());
        Ok(())
    }
}

/// Check constraint names, scoped to `"schema"."table"`
#[derive(Debug, Default)]
pub struct CheckRegistry {
    by_table: HashMap<String, HashSet<String>>,
}

impl CheckRegistry {
    pub fn register(&mut self, schema: &str, table: &str, name: &str) -> SnapshotResult<()> {
        let key = format!("\"{}\".\"{}\"", schema, table);
        if !self.by_table.entry(key).or_default().insert(name.to_string()) {
            return Err(SnapshotError::DuplicateCheckConstraintName {
                schema: schema.to_string(),
                table: table.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Index names, scoped to a schema
#[derive(Debug, Default)]
pub struct IndexRegistry {
    by_schema: HashMap<String, HashSet<String>>,
}

impl IndexRegistry {
    pub fn register(&mut self, schema: &str, table: &str, name: &str) -> SnapshotResult<()> {
        if !self
            .by_schema
            .entry(schema.to_string())
            .or_default()
            .insert(name.to_string())
        {
            return Err(SnapshotError::DuplicateIndexName {
                schema: schema.to_string(),
                table: table.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Policy names across the whole snapshot
#[derive(Debug, Default)]
pub struct PolicyRegistry {
    owners: HashMap<String, String>,
}

impl PolicyRegistry {
    /// `owner` is the qualified name of the table the policy is attached to
    pub fn register(&mut self, name: &str, owner: &str) -> SnapshotResult<()> {
        if let Some(existing) = self.owners.get(name) {
            return Err(SnapshotError::DuplicatePolicyName {
                name: name.to_string(),
                owner: owner.to_string(),
                existing_owner: existing.clone(),
            });
        }
        self.owners.insert(name.to_string(), owner.to_string());
        Ok(())
    }
}

/// View names, scoped to a schema
#[derive(Debug, Default)]
pub struct ViewRegistry {
    names: HashSet<(String, String)>,
}

impl ViewRegistry {
    pub fn register(&mut self, schema: &str, name: &str) -> SnapshotResult<()> {
        if !self.names.insert((schema.to_string(), name.to_string())) {
            return Err(SnapshotError::DuplicateViewName {
                schema: schema.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Registries shared by every table and view of one conversion
#[derive(Debug, Default)]
pub struct Registries {
    pub indexes: IndexRegistry,
    pub checks: CheckRegistry,
    pub policies: PolicyRegistry,
    pub views: ViewRegistry,
}
