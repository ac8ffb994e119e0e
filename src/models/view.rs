//! View and materialized view descriptors

use super::table::ColumnDescriptor;
use super::DEFAULT_SCHEMA;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One projection of a view's select list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectedField {
    Column(ColumnDescriptor),
    Expression(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Defining query as SQL text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default)]
    pub selected_fields: Vec<SelectedField>,
    /// The view already exists in the target database and is not managed
    #[serde(default)]
    pub is_existing: bool,
    #[serde(default)]
    pub materialized: bool,
    #[serde(default, rename = "with", skip_serializing_if = "Option::is_none")]
    pub with_options: Option<IndexMap<String, serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_no_data: Option<bool>,
}

impl ViewDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn schema_or_public(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_or_public(), self.name)
    }
}
