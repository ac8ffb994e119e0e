//! Row-level-security policy mapping

use super::registry::PolicyRegistry;
use super::types::{Policy, Snapshot};
use crate::config::SnapshotConfig;
use crate::error::SnapshotResult;
use crate::models::{PolicyDescriptor, PolicyTo};
use tracing::{debug, warn};

/// Role applied when a policy names no target
pub const DEFAULT_POLICY_ROLE: &str = "public";

/// Flatten the `to` clause into sorted role names
pub fn resolve_targets(to: Option<&PolicyTo>) -> Vec<String> {
    let mut roles: Vec<String> = match to {
        None => vec![DEFAULT_POLICY_ROLE.to_string()],
        Some(PolicyTo::One(target)) => vec![target.role_name().to_string()],
        Some(PolicyTo::Many(targets)) => targets.iter().map(|t| t.role_name().to_string()).collect(),
    };
    roles.sort();
    roles
}

pub fn map_policy(desc: &PolicyDescriptor) -> Policy {
    Policy {
        name: desc.name.clone(),
        as_kind: desc.as_kind.unwrap_or_default(),
        for_command: desc.for_command.unwrap_or_default(),
        to: resolve_targets(desc.to.as_ref()),
        using: desc.using.clone(),
        with_check: desc.with_check.clone(),
        schema: None,
        on: None,
    }
}

/// Place standalone policies on their linked table.
///
/// Policies without a link are dropped with a warning and their names
/// returned. A policy linked to a table that is not part of the snapshot is
/// kept at the top level.
pub fn link_policies(
    policies: &[PolicyDescriptor],
    config: &SnapshotConfig,
    snapshot: &mut Snapshot,
    registry: &mut PolicyRegistry,
) -> SnapshotResult<Vec<String>> {
    let mut skipped = Vec::new();

    for desc in policies {
        let Some(linked) = &desc.linked_table else {
            warn!(
                policy = %desc.name,
                "Policy was skipped because it was not linked to any table. Link it with .link() or add it to a table's policies"
            );
            skipped.push(desc.name.clone());
            continue;
        };

        let schema = linked.schema_or_public();
        if !config.includes_schema(linked.schema.as_deref()) {
            debug!(policy = %desc.name, schema, "Policy skipped by schema filter");
            continue;
        }

        let table_key = format!("{}.{}", schema, linked.name);
        registry.register(&desc.name, &table_key)?;

        let mut policy = map_policy(desc);
        match snapshot.tables.get_mut(&table_key) {
            Some(table) => {
                table.policies.insert(policy.name.clone(), policy);
            }
            None => {
                policy.schema = Some(schema.to_string());
                policy.on = Some(format!("\"{}\".\"{}\"", schema, linked.name));
                snapshot.policies.insert(policy.name.clone(), policy);
            }
        }
    }

    Ok(skipped)
}
