//! Row-level-security policy descriptors

use super::TableRef;
use serde::{Deserialize, Serialize};

/// PERMISSIVE / RESTRICTIVE
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyAs {
    #[default]
    #[serde(alias = "permissive")]
    Permissive,
    #[serde(alias = "restrictive")]
    Restrictive,
}

/// Command a policy applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PolicyFor {
    #[default]
    #[serde(alias = "all")]
    All,
    #[serde(alias = "select")]
    Select,
    #[serde(alias = "insert")]
    Insert,
    #[serde(alias = "update")]
    Update,
    #[serde(alias = "delete")]
    Delete,
}

/// A role a policy targets: a plain name or a reference to a declared role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyTarget {
    RoleName(String),
    RoleRef { name: String },
}

impl PolicyTarget {
    pub fn role_name(&self) -> &str {
        match self {
            PolicyTarget::RoleName(name) => name,
            PolicyTarget::RoleRef { name } => name,
        }
    }
}

/// `to` clause: one target or a list of them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyTo {
    One(PolicyTarget),
    Many(Vec<PolicyTarget>),
}

/// Declared policy, inline on a table or standalone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDescriptor {
    pub name: String,
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_kind: Option<PolicyAs>,
    #[serde(default, rename = "for", skip_serializing_if = "Option::is_none")]
    pub for_command: Option<PolicyFor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<PolicyTo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub using: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with_check: Option<String>,
    /// Table a standalone policy was linked to after declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_table: Option<TableRef>,
}

impl PolicyDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_from_json_accepts_mixed_targets() {
        let policy: PolicyDescriptor = serde_json::from_value(json!({
            "name": "read_own",
            "as": "restrictive",
            "for": "select",
            "to": ["authenticated", {"name": "admin"}],
            "using": "owner_id = current_user_id()"
        }))
        .unwrap();

        assert_eq!(policy.as_kind, Some(PolicyAs::Restrictive));
        assert_eq!(policy.for_command, Some(PolicyFor::Select));
        assert_eq!(
            policy.to,
            Some(PolicyTo::Many(vec![
                PolicyTarget::RoleName("authenticated".to_string()),
                PolicyTarget::RoleRef { name: "admin".to_string() },
            ]))
        );
    }

    #[test]
    fn test_single_target() {
        let to: PolicyTo = serde_json::from_value(json!({"name": "admin"})).unwrap();
        assert_eq!(to, PolicyTo::One(PolicyTarget::RoleRef { name: "admin".to_string() }));
    }
}
