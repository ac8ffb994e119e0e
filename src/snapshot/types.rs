//! Snapshot document types
//!
//! The serialized shape of a schema snapshot. All maps are insertion-ordered
//! so that serializing the same snapshot twice yields identical bytes.

use crate::models::{IdentityKind, NullsOrder, PolicyAs, PolicyFor, ReferentialAction};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Format version of the snapshot document
pub const SNAPSHOT_VERSION: &str = "7";

/// SQL dialect tag written into every snapshot
pub const SNAPSHOT_DIALECT: &str = "postgresql";

/// Complete schema snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub dialect: String,
    pub tables: IndexMap<String, Table>,
    pub enums: IndexMap<String, Enum>,
    pub schemas: IndexMap<String, String>,
    pub sequences: IndexMap<String, Sequence>,
    pub roles: IndexMap<String, Role>,
    /// Linked policies whose table is not part of this snapshot
    pub policies: IndexMap<String, Policy>,
    pub views: IndexMap<String, View>,
    #[serde(rename = "_meta")]
    pub meta: SnapshotMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl Snapshot {
    /// Empty snapshot with the current version and dialect tags
    pub fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_string(),
            dialect: SNAPSHOT_DIALECT.to_string(),
            tables: IndexMap::new(),
            enums: IndexMap::new(),
            schemas: IndexMap::new(),
            sequences: IndexMap::new(),
            roles: IndexMap::new(),
            policies: IndexMap::new(),
            views: IndexMap::new(),
            meta: SnapshotMeta::default(),
            provider: None,
            project_id: None,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// SHA-256 of the serialized document
    pub fn checksum(&self) -> Result<String, serde_json::Error> {
        let bytes = serde_json::to_vec(self)?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Bookkeeping maps reserved for the diff stage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub schemas: IndexMap<String, String>,
    pub tables: IndexMap<String, String>,
    pub columns: IndexMap<String, String>,
}

/// Table entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub name: String,
    /// Declared schema, empty when the table was declared without one
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub columns: IndexMap<String, Column>,
    pub indexes: IndexMap<String, Index>,
    pub foreign_keys: IndexMap<String, ForeignKey>,
    pub composite_primary_keys: IndexMap<String, PrimaryKey>,
    pub unique_constraints: IndexMap<String, UniqueConstraint>,
    pub policies: IndexMap<String, Policy>,
    pub check_constraints: IndexMap<String, CheckConstraint>,
    #[serde(rename = "isRLSEnabled")]
    pub is_rls_enabled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relations: Vec<Relation>,
}

/// Column entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_schema: Option<String>,
    pub primary_key: bool,
    pub not_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lab: Option<ColumnLab>,
}

/// Passthrough annotations; never used for constraint logic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnLab {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_fn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update_fn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_shape: Option<String>,
}

impl ColumnLab {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.enum_values.is_none()
            && self.default_fn.is_none()
            && self.on_update_fn.is_none()
            && self.json_shape.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratedKind {
    Stored,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedColumn {
    #[serde(rename = "as")]
    pub expression: String,
    #[serde(rename = "type")]
    pub kind: GeneratedKind,
}

/// Identity column with its fully resolved sequence options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    #[serde(rename = "type")]
    pub kind: IdentityKind,
    pub name: String,
    pub schema: String,
    pub increment: String,
    pub start_with: String,
    pub min_value: String,
    pub max_value: String,
    pub cache: String,
    pub cycle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexColumn {
    pub expression: String,
    pub is_expression: bool,
    pub asc: bool,
    pub nulls: NullsOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opclass: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Index {
    pub name: String,
    pub columns: Vec<IndexColumn>,
    pub is_unique: bool,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    pub concurrently: bool,
    pub method: String,
    #[serde(rename = "with")]
    pub with_params: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKey {
    pub name: String,
    pub table_from: String,
    pub table_to: String,
    pub schema_to: String,
    pub columns_from: Vec<String>,
    pub columns_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub name: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueConstraint {
    pub name: String,
    pub nulls_not_distinct: bool,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConstraint {
    pub name: String,
    pub value: String,
}

/// Row-level-security policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    pub name: String,
    #[serde(rename = "as")]
    pub as_kind: PolicyAs,
    #[serde(rename = "for")]
    pub for_command: PolicyFor,
    pub to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_check: Option<String>,
    /// Only set on top-level (table-less) policies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// `"schema"."table"` the policy is attached to, top-level policies only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    One,
    Many,
}

/// ORM-level relation attached to a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_name: Option<String>,
    pub referenced_table: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub name: String,
    pub schema: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sequence {
    pub name: String,
    pub schema: String,
    pub increment: String,
    pub start_with: String,
    pub min_value: String,
    pub max_value: String,
    pub cache: String,
    pub cycle: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub name: String,
    pub create_db: bool,
    pub create_role: bool,
    pub inherit: bool,
}

/// View or materialized view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub name: String,
    pub schema: String,
    pub columns: IndexMap<String, Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    pub materialized: bool,
    pub is_existing: bool,
    #[serde(default, rename = "with", skip_serializing_if = "Option::is_none")]
    pub with_options: Option<IndexMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_no_data: Option<bool>,
}
