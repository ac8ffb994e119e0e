//! Database-level descriptors: enums, sequences, roles and ORM relations

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric sequence option, given either as text or as a JSON number.
///
/// Text is the lossless form for 64-bit bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericField::Text(s) => f.write_str(s),
            NumericField::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for NumericField {
    fn from(value: &str) -> Self {
        NumericField::Text(value.to_string())
    }
}

impl From<i64> for NumericField {
    fn from(value: i64) -> Self {
        NumericField::Number(value.into())
    }
}

/// Options shared by identity columns and standalone sequences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment: Option<NumericField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<NumericField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<NumericField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_with: Option<NumericField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<NumericField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle: Option<bool>,
}

/// Standalone sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<SequenceOptions>,
}

/// User-defined enum type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub values: Vec<String>,
}

/// Database role
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_db: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_role: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit: Option<bool>,
    /// Role already exists outside the managed schema
    #[serde(default)]
    pub is_existing: bool,
}

/// ORM-level relations declared for one table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationDescriptor {
    /// Database name of the owning table
    pub db_name: String,
    #[serde(default)]
    pub relations: Vec<RelationField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationField {
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_name: Option<String>,
    pub referenced_table_name: String,
    #[serde(default)]
    pub is_many: bool,
}
