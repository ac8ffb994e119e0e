//! Table assembly

use super::column::{map_column, ColumnContext};
use super::constraints::{map_checks, map_foreign_keys, map_indexes, map_primary_keys, map_unique_constraints};
use super::policy::map_policy;
use super::registry::{Registries, UniqueRegistry};
use super::types::{Relation, RelationKind, Table};
use crate::config::SnapshotConfig;
use crate::error::SnapshotResult;
use crate::models::{SchemaObjectGraph, TableDescriptor};
use indexmap::IndexMap;
use tracing::debug;

fn relations_for(graph: &SchemaObjectGraph, table: &str) -> Vec<Relation> {
    graph
        .relations
        .iter()
        .filter(|r| r.db_name == table)
        .flat_map(|r| r.relations.iter())
        .map(|field| Relation {
            kind: if field.is_many {
                RelationKind::Many
            } else {
                RelationKind::One
            },
            field_name: field.field_name.clone(),
            relation_name: field.relation_name.clone(),
            referenced_table: field.referenced_table_name.clone(),
        })
        .collect()
}

/// Build the snapshot entry of one table, keyed `schema.name`.
///
/// Returns `None` for tables outside the schema filter; those never reach
/// the registries.
pub fn assemble_table(
    desc: &TableDescriptor,
    graph: &SchemaObjectGraph,
    config: &SnapshotConfig,
    registries: &mut Registries,
) -> SnapshotResult<Option<(String, Table)>> {
    if !config.includes_schema(desc.schema.as_deref()) {
        debug!(table = %desc.qualified_name(), "Table skipped by schema filter");
        return Ok(None);
    }

    let casing = config.casing;
    let ctx = ColumnContext {
        table: &desc.name,
        schema: desc.schema.as_deref(),
        casing,
    };

    let mut uniques = UniqueRegistry::new(&desc.name);
    let mut columns = IndexMap::new();
    let mut unique_constraints = IndexMap::new();

    for column in &desc.columns {
        let mapped = map_column(column, ctx, &mut uniques)?;
        if let Some(unique) = mapped.unique {
            unique_constraints.insert(unique.name.clone(), unique);
        }
        columns.insert(mapped.column.name.clone(), mapped.column);
    }

    let composite_primary_keys = map_primary_keys(desc, casing);
    unique_constraints.extend(map_unique_constraints(desc, casing, &mut uniques)?);
    let foreign_keys = map_foreign_keys(desc, graph, casing);
    let indexes = map_indexes(desc, casing, &mut registries.indexes)?;

    let key = desc.qualified_name();
    let mut policies = IndexMap::new();
    for policy in &desc.policies {
        registries.policies.register(&policy.name, &key)?;
        policies.insert(policy.name.clone(), map_policy(policy));
    }

    let check_constraints = map_checks(desc, &mut registries.checks)?;

    let table = Table {
        name: desc.name.clone(),
        schema: desc.schema.clone().unwrap_or_default(),
        description: desc.description.clone(),
        columns,
        indexes,
        foreign_keys,
        composite_primary_keys,
        unique_constraints,
        policies,
        check_constraints,
        is_rls_enabled: desc.enable_rls,
        relations: relations_for(graph, &desc.name),
    };

    Ok(Some((key, table)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapshotError;
    use crate::models::{
        ColumnDescriptor, IndexDescriptor, IndexMember, PolicyDescriptor, RelationDescriptor,
        RelationField,
    };
    use pretty_assertions::assert_eq;

    fn users() -> TableDescriptor {
        let mut table = TableDescriptor::new("users");
        let mut id = ColumnDescriptor::new("id", "integer");
        id.primary = true;
        id.not_null = true;
        let mut email = ColumnDescriptor::new("email", "text");
        email.is_unique = true;
        table.columns = vec![id, email];
        table
    }

    #[test]
    fn test_assembles_members() {
        let mut desc = users();
        desc.enable_rls = true;
        desc.policies = vec![PolicyDescriptor::new("own_rows")];
        let graph = SchemaObjectGraph {
            relations: vec![RelationDescriptor {
                db_name: "users".to_string(),
                relations: vec![RelationField {
                    field_name: "posts".to_string(),
                    relation_name: None,
                    referenced_table_name: "posts".to_string(),
                    is_many: true,
                }],
            }],
            ..Default::default()
        };

        let (key, table) = assemble_table(
            &desc,
            &graph,
            &SnapshotConfig::default(),
            &mut Registries::default(),
        )
        .unwrap()
        .unwrap();

        assert_eq!(key, "public.users");
        assert_eq!(table.schema, "");
        assert!(table.is_rls_enabled);
        assert_eq!(table.columns.keys().collect::<Vec<_>>(), vec!["id", "email"]);
        assert!(table.unique_constraints.contains_key("users_email_unique"));
        assert!(table.policies.contains_key("own_rows"));
        assert_eq!(table.relations.len(), 1);
        assert_eq!(table.relations[0].kind, RelationKind::Many);
    }

    #[test]
    fn test_filtered_table_touches_no_registry() {
        let mut desc = users();
        desc.schema = Some("audit".to_string());
        desc.indexes = vec![IndexDescriptor {
            name: Some("idx1".to_string()),
            members: vec![IndexMember::column("id")],
            ..Default::default()
        }];
        let config = SnapshotConfig {
            schema_filter: Some(vec!["public".to_string()]),
            ..Default::default()
        };
        let mut registries = Registries::default();

        let skipped = assemble_table(&desc, &SchemaObjectGraph::default(), &config, &mut registries).unwrap();
        assert!(skipped.is_none());

        // the same index name is still free in that schema
        assert!(registries.indexes.register("audit", "other", "idx1").is_ok());
    }

    #[test]
    fn test_inline_policy_names_are_global() {
        let mut first = users();
        first.policies = vec![PolicyDescriptor::new("p")];
        let mut second = TableDescriptor::new("posts");
        second.policies = vec![PolicyDescriptor::new("p")];

        let graph = SchemaObjectGraph::default();
        let config = SnapshotConfig::default();
        let mut registries = Registries::default();

        assemble_table(&first, &graph, &config, &mut registries).unwrap();
        let err = assemble_table(&second, &graph, &config, &mut registries).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicatePolicyName { ref existing_owner, .. } if existing_owner == "public.users"));
    }
}
