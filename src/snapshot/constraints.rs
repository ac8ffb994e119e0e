//! Constraint and index mapping
//!
//! Auto-generated names are built from the cased column names. Declared
//! primary key and foreign key names get the same column renames applied
//! token by token, so they keep pointing at the columns they were named after.

use super::casing::{column_renames, referenced_column_name, rewrite_declared_name, Casing};
use super::column::unique_key_name;
use super::registry::{CheckRegistry, IndexRegistry, UniqueRegistry};
use super::types::{CheckConstraint, ForeignKey, Index, IndexColumn, PrimaryKey, UniqueConstraint};
use crate::error::{SnapshotError, SnapshotResult};
use crate::models::{
    IndexMember, NullsOrder, SchemaObjectGraph, SortOrder, TableDescriptor,
};
use indexmap::IndexMap;

/// Operator classes usable on pgvector columns
pub const VECTOR_OPERATOR_CLASSES: &[&str] = &[
    "vector_l2_ops",
    "vector_ip_ops",
    "vector_cosine_ops",
    "vector_l1_ops",
    "bit_hamming_ops",
    "bit_jaccard_ops",
    "halfvec_l2_ops",
    "sparsevec_l2_ops",
];

const DEFAULT_INDEX_METHOD: &str = "btree";

fn cased_columns(table: &TableDescriptor, columns: &[String], casing: Option<Casing>) -> Vec<String> {
    columns
        .iter()
        .map(|c| referenced_column_name(Some(table), c, casing))
        .collect()
}

/// `vector` or `vector(n)`
fn is_vector_type(sql_type: &str) -> bool {
    let lowered = sql_type.trim().to_ascii_lowercase();
    match lowered.strip_prefix("vector") {
        Some(rest) => rest.is_empty() || rest.starts_with('('),
        None => false,
    }
}

pub fn index_name(table: &str, columns: &[String]) -> String {
    format!("{}_{}_index", table, columns.join("_"))
}

pub fn map_primary_keys(table: &TableDescriptor, casing: Option<Casing>) -> IndexMap<String, PrimaryKey> {
    let renames = column_renames(table, casing);

    table
        .primary_keys
        .iter()
        .map(|pk| {
            let columns = cased_columns(table, &pk.columns, casing);
            let name = match &pk.name {
                Some(declared) => rewrite_declared_name(declared, &renames),
                None => format!("{}_{}_pk", table.name, columns.join("_")),
            };
            (name.clone(), PrimaryKey { name, columns })
        })
        .collect()
}

/// Table-level unique constraints; names share `uniques` with column-level ones
pub fn map_unique_constraints(
    table: &TableDescriptor,
    casing: Option<Casing>,
    uniques: &mut UniqueRegistry,
) -> SnapshotResult<IndexMap<String, UniqueConstraint>> {
    let mut out = IndexMap::new();

    for unique in &table.unique_constraints {
        let columns = cased_columns(table, &unique.columns, casing);
        let name = unique
            .name
            .clone()
            .unwrap_or_else(|| unique_key_name(&table.name, &columns));

        uniques.register(&name, &columns)?;
        out.insert(
            name.clone(),
            UniqueConstraint {
                name,
                nulls_not_distinct: unique.nulls_not_distinct,
                columns,
            },
        );
    }
    Ok(out)
}

pub fn map_foreign_keys(
    table: &TableDescriptor,
    graph: &SchemaObjectGraph,
    casing: Option<Casing>,
) -> IndexMap<String, ForeignKey> {
    let renames = column_renames(table, casing);

    table
        .foreign_keys
        .iter()
        .map(|fk| {
            let target = graph.find_table(&fk.foreign_table.name, fk.foreign_table.schema.as_deref());

            let columns_from = cased_columns(table, &fk.columns, casing);
            let columns_to: Vec<String> = fk
                .foreign_columns
                .iter()
                .map(|c| referenced_column_name(target, c, casing))
                .collect();

            let name = match &fk.name {
                Some(declared) => {
                    let mut all = renames.clone();
                    if let Some(target) = target {
                        all.extend(column_renames(target, casing));
                    }
                    rewrite_declared_name(declared, &all)
                }
                None => format!(
                    "{}_{}_{}_{}_fk",
                    table.name,
                    columns_from.join("_"),
                    fk.foreign_table.name,
                    columns_to.join("_")
                ),
            };

            let mapped = ForeignKey {
                name: name.clone(),
                table_from: table.name.clone(),
                table_to: fk.foreign_table.name.clone(),
                schema_to: fk.foreign_table.schema_or_public().to_string(),
                columns_from,
                columns_to,
                on_delete: fk.on_delete,
                on_update: fk.on_update,
            };
            (name, mapped)
        })
        .collect()
}

pub fn map_checks(
    table: &TableDescriptor,
    checks: &mut CheckRegistry,
) -> SnapshotResult<IndexMap<String, CheckConstraint>> {
    let mut out = IndexMap::new();

    for check in &table.checks {
        checks.register(table.schema_or_public(), &table.name, &check.name)?;
        out.insert(
            check.name.clone(),
            CheckConstraint {
                name: check.name.clone(),
                value: check.value.clone(),
            },
        );
    }
    Ok(out)
}

pub fn map_indexes(
    table: &TableDescriptor,
    casing: Option<Casing>,
    indexes: &mut IndexRegistry,
) -> SnapshotResult<IndexMap<String, Index>> {
    let mut out = IndexMap::new();

    for index in &table.indexes {
        let mut generated_parts = Vec::with_capacity(index.members.len());
        let mut columns = Vec::with_capacity(index.members.len());

        for member in &index.members {
            match member {
                IndexMember::Expression(sql) => {
                    if index.name.is_none() {
                        return Err(SnapshotError::MissingIndexName {
                            table: table.name.clone(),
                            expression: sql.clone(),
                        });
                    }
                    columns.push(IndexColumn {
                        expression: sql.clone(),
                        is_expression: true,
                        asc: true,
                        nulls: NullsOrder::Last,
                        opclass: None,
                    });
                }
                IndexMember::Column(indexed) => {
                    let declared = table.column(&indexed.name);
                    if declared.is_some_and(|c| is_vector_type(&c.sql_type)) && indexed.opclass.is_none() {
                        return Err(SnapshotError::MissingOperatorClass {
                            table: table.name.clone(),
                            column: indexed.name.clone(),
                            available: VECTOR_OPERATOR_CLASSES.join(", "),
                        });
                    }

                    let name = referenced_column_name(Some(table), &indexed.name, casing);
                    let descending = indexed.order == Some(SortOrder::Desc);
                    generated_parts.push(name.clone());
                    columns.push(IndexColumn {
                        expression: name,
                        is_expression: false,
                        asc: !descending,
                        nulls: indexed.nulls.unwrap_or(if descending {
                            NullsOrder::First
                        } else {
                            NullsOrder::Last
                        }),
                        opclass: indexed.opclass.clone(),
                    });
                }
            }
        }

        let name = index
            .name
            .clone()
            .unwrap_or_else(|| index_name(&table.name, &generated_parts));
        indexes.register(table.schema_or_public(), &table.name, &name)?;

        out.insert(
            name.clone(),
            Index {
                name,
                columns,
                is_unique: index.unique,
                where_clause: index.where_clause.clone(),
                concurrently: index.concurrently,
                method: index
                    .method
                    .clone()
                    .unwrap_or_else(|| DEFAULT_INDEX_METHOD.to_string()),
                with_params: index.with_params.clone(),
            },
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CheckDescriptor, ColumnDescriptor, ForeignKeyDescriptor, IndexDescriptor, IndexedColumn,
        PrimaryKeyDescriptor, ReferentialAction, TableRef, UniqueConstraintDescriptor,
    };
    use pretty_assertions::assert_eq;

    fn keyed(name: &str, sql_type: &str) -> ColumnDescriptor {
        let mut column = ColumnDescriptor::new(name, sql_type);
        column.key_as_name = true;
        column
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn users() -> TableDescriptor {
        let mut table = TableDescriptor::new("users");
        table.columns = vec![
            keyed("a", "integer"),
            keyed("b", "integer"),
            keyed("orgId", "integer"),
            keyed("embedding", "vector(3)"),
        ];
        table
    }

    #[test]
    fn test_index_auto_name() {
        let mut table = users();
        table.indexes = vec![IndexDescriptor {
            members: vec![IndexMember::column("a"), IndexMember::column("b")],
            ..Default::default()
        }];

        let indexes = map_indexes(&table, None, &mut IndexRegistry::default()).unwrap();
        let index = &indexes["users_a_b_index"];

        assert_eq!(index.method, "btree");
        assert!(index.with_params.is_empty());
        assert_eq!(
            index.columns[0],
            IndexColumn {
                expression: "a".to_string(),
                is_expression: false,
                asc: true,
                nulls: NullsOrder::Last,
                opclass: None,
            }
        );
    }

    #[test]
    fn test_descending_index_column_sorts_nulls_first() {
        let mut table = users();
        table.indexes = vec![IndexDescriptor {
            name: Some("by_a".to_string()),
            members: vec![
                IndexMember::Column(IndexedColumn {
                    name: "a".to_string(),
                    order: Some(SortOrder::Desc),
                    ..Default::default()
                }),
                IndexMember::Expression("lower(b)".to_string()),
            ],
            ..Default::default()
        }];

        let indexes = map_indexes(&table, None, &mut IndexRegistry::default()).unwrap();
        let columns = &indexes["by_a"].columns;

        assert!(!columns[0].asc);
        assert_eq!(columns[0].nulls, NullsOrder::First);
        assert!(columns[1].is_expression);
        assert_eq!(columns[1].nulls, NullsOrder::Last);
    }

    #[test]
    fn test_expression_index_needs_a_name() {
        let mut table = users();
        table.indexes = vec![IndexDescriptor {
            members: vec![IndexMember::Expression("lower(b)".to_string())],
            ..Default::default()
        }];

        let err = map_indexes(&table, None, &mut IndexRegistry::default()).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::MissingIndexName {
                table: "users".to_string(),
                expression: "lower(b)".to_string(),
            }
        );
    }

    #[test]
    fn test_vector_index_needs_operator_class() {
        let mut table = users();
        table.indexes = vec![IndexDescriptor {
            members: vec![IndexMember::column("embedding")],
            method: Some("hnsw".to_string()),
            ..Default::default()
        }];

        let err = map_indexes(&table, None, &mut IndexRegistry::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingOperatorClass { ref available, .. } if available.contains("vector_cosine_ops")));

        table.indexes[0].members = vec![IndexMember::Column(IndexedColumn {
            name: "embedding".to_string(),
            opclass: Some("vector_cosine_ops".to_string()),
            ..Default::default()
        })];
        let indexes = map_indexes(&table, None, &mut IndexRegistry::default()).unwrap();
        assert_eq!(indexes["users_embedding_index"].method, "hnsw");
    }

    #[test]
    fn test_index_collision_within_schema() {
        let mut first = users();
        first.indexes = vec![IndexDescriptor {
            name: Some("idx1".to_string()),
            members: vec![IndexMember::column("a")],
            ..Default::default()
        }];
        let mut second = TableDescriptor::new("posts");
        second.columns = vec![keyed("a", "integer")];
        second.indexes = first.indexes.clone();

        let mut registry = IndexRegistry::default();
        map_indexes(&first, None, &mut registry).unwrap();
        let err = map_indexes(&second, None, &mut registry).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateIndexName { ref table, .. } if table == "posts"));

        second.schema = Some("audit".to_string());
        assert!(map_indexes(&second, None, &mut registry).is_ok());
    }

    #[test]
    fn test_primary_key_names() {
        let mut table = users();
        table.primary_keys = vec![PrimaryKeyDescriptor {
            name: None,
            columns: strings(&["orgId", "a"]),
        }];
        let generated = map_primary_keys(&table, Some(Casing::SnakeCase));
        assert_eq!(
            generated["users_org_id_a_pk"].columns,
            strings(&["org_id", "a"])
        );

        table.primary_keys[0].name = Some("pk_orgId_a".to_string());
        let declared = map_primary_keys(&table, Some(Casing::SnakeCase));
        assert!(declared.contains_key("pk_org_id_a"));
    }

    #[test]
    fn test_table_unique_collides_with_column_unique() {
        let mut table = users();
        table.unique_constraints = vec![UniqueConstraintDescriptor {
            name: None,
            columns: strings(&["a"]),
            nulls_not_distinct: false,
        }];

        let mut uniques = UniqueRegistry::new("users");
        uniques.register("users_a_unique", &strings(&["a"])).unwrap();

        let err = map_unique_constraints(&table, None, &mut uniques).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateUniqueConstraint { .. }));
    }

    #[test]
    fn test_foreign_key_uses_referenced_table_casing() {
        let mut orgs = TableDescriptor::new("orgs");
        orgs.columns = vec![keyed("orgId", "integer")];

        let mut table = users();
        table.foreign_keys = vec![ForeignKeyDescriptor {
            name: None,
            columns: strings(&["orgId"]),
            foreign_table: TableRef::new("orgs"),
            foreign_columns: strings(&["orgId"]),
            on_delete: Some(ReferentialAction::Cascade),
            on_update: None,
        }];

        let graph = SchemaObjectGraph {
            tables: vec![table.clone(), orgs],
            ..Default::default()
        };

        let fks = map_foreign_keys(&table, &graph, Some(Casing::SnakeCase));
        assert_eq!(
            fks["users_org_id_orgs_org_id_fk"],
            ForeignKey {
                name: "users_org_id_orgs_org_id_fk".to_string(),
                table_from: "users".to_string(),
                table_to: "orgs".to_string(),
                schema_to: "public".to_string(),
                columns_from: strings(&["org_id"]),
                columns_to: strings(&["org_id"]),
                on_delete: Some(ReferentialAction::Cascade),
                on_update: None,
            }
        );
    }

    #[test]
    fn test_unknown_foreign_table_columns_pass_through() {
        let mut table = users();
        table.foreign_keys = vec![ForeignKeyDescriptor {
            name: Some("fk_orgId".to_string()),
            columns: strings(&["orgId"]),
            foreign_table: TableRef::new("orgs").in_schema("crm"),
            foreign_columns: strings(&["orgId"]),
            on_delete: None,
            on_update: None,
        }];

        let fks = map_foreign_keys(&table, &SchemaObjectGraph::default(), Some(Casing::SnakeCase));
        let fk = &fks["fk_org_id"];
        assert_eq!(fk.schema_to, "crm");
        assert_eq!(fk.columns_to, strings(&["orgId"]));
    }

    #[test]
    fn test_check_collision_within_table() {
        let mut table = users();
        table.checks = vec![
            CheckDescriptor {
                name: "positive".to_string(),
                value: "a > 0".to_string(),
            },
            CheckDescriptor {
                name: "positive".to_string(),
                value: "b > 0".to_string(),
            },
        ];

        let err = map_checks(&table, &mut CheckRegistry::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateCheckConstraintName { .. }));
    }
}
