//! Foreign key descriptors

use super::TableRef;
use serde::{Deserialize, Serialize};

/// Referential action for ON DELETE / ON UPDATE
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum ReferentialAction {
    #[serde(rename = "restrict")]
    Restrict,
    #[serde(rename = "cascade")]
    Cascade,
    #[serde(rename = "set null")]
    SetNull,
    #[serde(rename = "no action")]
    NoAction,
    #[serde(rename = "set default")]
    SetDefault,
}

impl ReferentialAction {
    /// Decode the single-letter action code stored in `pg_constraint`
    pub fn from_catalog_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(ReferentialAction::NoAction),
            "r" => Some(ReferentialAction::Restrict),
            "c" => Some(ReferentialAction::Cascade),
            "n" => Some(ReferentialAction::SetNull),
            "d" => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }
}

/// Declared foreign key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeignKeyDescriptor {
    /// Optional custom constraint name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub foreign_table: TableRef,
    pub foreign_columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<ReferentialAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<ReferentialAction>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referential_action_wire_names() {
        let action: ReferentialAction = serde_json::from_str("\"set null\"").unwrap();
        assert_eq!(action, ReferentialAction::SetNull);
        assert_eq!(serde_json::to_string(&ReferentialAction::NoAction).unwrap(), "\"no action\"");
    }

    #[test]
    fn test_catalog_codes() {
        assert_eq!(ReferentialAction::from_catalog_code("c"), Some(ReferentialAction::Cascade));
        assert_eq!(ReferentialAction::from_catalog_code("a"), Some(ReferentialAction::NoAction));
        assert_eq!(ReferentialAction::from_catalog_code("x"), None);
    }
}
