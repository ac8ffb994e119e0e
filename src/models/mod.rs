//! Schema object graph
//!
//! The input side of the serializer: descriptors for every object the
//! schema-authoring layer (or a live-database introspection) can declare.
//! Everything here deserializes from camelCase JSON so graphs can be fed to
//! the CLI as files.

pub mod database;
pub mod foreign_key;
pub mod policy;
pub mod table;
pub mod value;
pub mod view;

// Re-export commonly used types
pub use database::*;
pub use foreign_key::*;
pub use policy::*;
pub use table::*;
pub use value::*;
pub use view::*;

use serde::{Deserialize, Serialize};

/// Schema every unqualified object lives in.
pub const DEFAULT_SCHEMA: &str = "public";

/// Complete declared schema, as handed over by the authoring layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaObjectGraph {
    #[serde(default)]
    pub tables: Vec<TableDescriptor>,
    #[serde(default)]
    pub views: Vec<ViewDescriptor>,
    #[serde(default)]
    pub enums: Vec<EnumDescriptor>,
    #[serde(default)]
    pub sequences: Vec<SequenceDescriptor>,
    #[serde(default)]
    pub roles: Vec<RoleDescriptor>,
    /// Standalone policies; inline ones live on their table
    #[serde(default)]
    pub policies: Vec<PolicyDescriptor>,
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(default)]
    pub relations: Vec<RelationDescriptor>,
}

impl SchemaObjectGraph {
    /// Parse a graph from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Find a table by name and (optional) schema
    pub fn find_table(&self, name: &str, schema: Option<&str>) -> Option<&TableDescriptor> {
        let schema = schema.unwrap_or(DEFAULT_SCHEMA);
        self.tables
            .iter()
            .find(|t| t.name == name && t.schema_or_public() == schema)
    }
}

/// Reference to a table by name, as used by foreign keys and linked policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
        }
    }

    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn schema_or_public(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_from_json_defaults_missing_collections() {
        let graph = SchemaObjectGraph::from_json(r#"{"tables": [{"name": "users"}]}"#).unwrap();

        assert_eq!(graph.tables.len(), 1);
        assert!(graph.views.is_empty());
        assert!(graph.policies.is_empty());
        assert_eq!(graph.tables[0].schema_or_public(), "public");
    }

    #[test]
    fn test_find_table_matches_schema() {
        let graph = SchemaObjectGraph::from_json(
            r#"{"tables": [{"name": "users"}, {"name": "users", "schema": "auth"}]}"#,
        )
        .unwrap();

        assert_eq!(
            graph.find_table("users", Some("auth")).and_then(|t| t.schema.as_deref()),
            Some("auth")
        );
        assert!(graph.find_table("users", None).unwrap().schema.is_none());
        assert!(graph.find_table("orders", None).is_none());
    }
}
