//! Table-related descriptors

use super::database::SequenceOptions;
use super::foreign_key::ForeignKeyDescriptor;
use super::policy::PolicyDescriptor;
use super::value::DefaultValue;
use super::DEFAULT_SCHEMA;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Declared table with all of its members
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyDescriptor>,
    #[serde(default)]
    pub checks: Vec<CheckDescriptor>,
    #[serde(default)]
    pub primary_keys: Vec<PrimaryKeyDescriptor>,
    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraintDescriptor>,
    #[serde(default)]
    pub policies: Vec<PolicyDescriptor>,
    #[serde(default, rename = "enableRLS")]
    pub enable_rls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn schema_or_public(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// Key of this table in the snapshot (`schema.name`)
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_or_public(), self.name)
    }

    /// Look up a column by its declared (pre-casing) name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Declared column
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub name: String,
    /// Name was derived from the authoring key, so the casing policy applies
    #[serde(default)]
    pub key_as_name: bool,
    pub sql_type: String,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_type: Option<UniqueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated: Option<GeneratedExpression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<IdentityDescriptor>,
    /// Set when the column's type is a user-defined enum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_type: Option<EnumTypeRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,

    // Annotations carried through to the snapshot untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_fn_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update_fn_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_shape: Option<String>,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            ..Default::default()
        }
    }
}

/// NULL handling of a unique constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UniqueType {
    #[serde(rename = "distinct")]
    Distinct,
    #[serde(rename = "not distinct")]
    NotDistinct,
}

/// Enum type a column is declared with
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumTypeRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
}

/// SQL producer evaluated when the snapshot is generated
#[derive(Clone)]
pub struct SqlThunk(Arc<dyn Fn() -> String + Send + Sync>);

impl SqlThunk {
    pub fn new(f: impl Fn() -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn render(&self) -> String {
        (self.0)()
    }
}

impl fmt::Debug for SqlThunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SqlThunk(..)")
    }
}

/// Expression of a stored generated column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneratedExpression {
    Sql(String),
    #[serde(skip)]
    Deferred(SqlThunk),
}

impl GeneratedExpression {
    pub fn to_sql(&self) -> String {
        match self {
            GeneratedExpression::Sql(sql) => sql.clone(),
            GeneratedExpression::Deferred(thunk) => thunk.render(),
        }
    }
}

/// GENERATED ALWAYS / BY DEFAULT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IdentityKind {
    Always,
    ByDefault,
}

/// Identity settings of a column
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityDescriptor {
    #[serde(rename = "type")]
    pub kind: IdentityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<SequenceOptions>,
}

/// Sort direction of an index member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// NULLS FIRST / NULLS LAST
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullsOrder {
    First,
    Last,
}

/// Column participating in an index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<NullsOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opclass: Option<String>,
}

/// One member of an index: a plain column or a SQL expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexMember {
    Column(IndexedColumn),
    Expression(String),
}

impl IndexMember {
    pub fn column(name: impl Into<String>) -> Self {
        IndexMember::Column(IndexedColumn {
            name: name.into(),
            ..Default::default()
        })
    }
}

/// Declared index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub members: Vec<IndexMember>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<String>,
    #[serde(default)]
    pub concurrently: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, rename = "with")]
    pub with_params: IndexMap<String, serde_json::Value>,
}

/// Composite primary key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryKeyDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
}

/// Table-level unique constraint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UniqueConstraintDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
    #[serde(default)]
    pub nulls_not_distinct: bool,
}

/// CHECK constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckDescriptor {
    pub name: String,
    pub value: String,
}
