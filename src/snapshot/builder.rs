//! Snapshot builder
//!
//! Turns a [`SchemaObjectGraph`] into a [`Snapshot`]. Every call allocates its
//! own registries; the first fatal error aborts the conversion.

use super::policy::link_policies;
use super::registry::Registries;
use super::resolver::{resolve_sequence_options, BIGINT_BOUNDS};
use super::table::assemble_table;
use super::types::{Enum, Role, Sequence, Snapshot};
use super::view::assemble_view;
use crate::config::SnapshotConfig;
use crate::error::SnapshotResult;
use crate::models::{SchemaObjectGraph, DEFAULT_SCHEMA};
use tracing::{debug, warn};

/// Non-fatal findings of a conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotReport {
    /// Standalone policies dropped because they were not linked to a table
    pub skipped_policies: Vec<String>,
    /// Enum declarations that conflicted with an earlier one (`schema.name`)
    pub ignored_enums: Vec<String>,
    /// Sequence declarations that conflicted with an earlier one (`schema.name`)
    pub ignored_sequences: Vec<String>,
    /// Tables excluded by the schema filter (`schema.name`)
    pub skipped_tables: Vec<String>,
}

/// Convert a declared schema into a snapshot
pub fn generate_snapshot(graph: &SchemaObjectGraph, config: &SnapshotConfig) -> SnapshotResult<Snapshot> {
    generate_snapshot_with_report(graph, config).map(|(snapshot, _)| snapshot)
}

/// Like [`generate_snapshot`], also returning what was skipped along the way
pub fn generate_snapshot_with_report(
    graph: &SchemaObjectGraph,
    config: &SnapshotConfig,
) -> SnapshotResult<(Snapshot, SnapshotReport)> {
    let mut snapshot = Snapshot::empty();
    snapshot.provider = config.provider.clone();
    snapshot.project_id = config.project_id.clone();

    let mut registries = Registries::default();
    let mut report = SnapshotReport::default();

    for desc in &graph.tables {
        match assemble_table(desc, graph, config, &mut registries)? {
            Some((key, table)) => {
                snapshot.tables.insert(key, table);
            }
            None => report.skipped_tables.push(desc.qualified_name()),
        }
    }

    report.skipped_policies = link_policies(&graph.policies, config, &mut snapshot, &mut registries.policies)?;

    for desc in &graph.views {
        if let Some((key, view)) = assemble_view(desc, config, &mut registries)? {
            snapshot.views.insert(key, view);
        }
    }

    for desc in &graph.enums {
        let schema = desc.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
        let key = format!("{}.{}", schema, desc.name);

        if let Some(existing) = snapshot.enums.get(&key) {
            if existing.values != desc.values {
                warn!(enum_name = %key, "Conflicting enum declaration ignored, keeping the first one");
                report.ignored_enums.push(key);
            }
            continue;
        }

        snapshot.enums.insert(
            key,
            Enum {
                name: desc.name.clone(),
                schema: schema.to_string(),
                values: desc.values.clone(),
            },
        );
    }

    for desc in &graph.sequences {
        let schema = desc.schema.as_deref().unwrap_or(DEFAULT_SCHEMA);
        let key = format!("{}.{}", schema, desc.name);
        let resolved = resolve_sequence_options(desc.options.as_ref(), BIGINT_BOUNDS);

        let sequence = Sequence {
            name: desc.name.clone(),
            schema: schema.to_string(),
            increment: resolved.increment,
            start_with: resolved.start_with,
            min_value: resolved.min_value,
            max_value: resolved.max_value,
            cache: resolved.cache,
            cycle: resolved.cycle,
        };

        if let Some(existing) = snapshot.sequences.get(&key) {
            if *existing != sequence {
                warn!(sequence = %key, "Conflicting sequence declaration ignored, keeping the first one");
                report.ignored_sequences.push(key);
            }
            continue;
        }
        snapshot.sequences.insert(key, sequence);
    }

    for desc in graph.roles.iter().filter(|r| !r.is_existing) {
        snapshot.roles.insert(
            desc.name.clone(),
            Role {
                name: desc.name.clone(),
                create_db: desc.create_db.unwrap_or(false),
                create_role: desc.create_role.unwrap_or(false),
                inherit: desc.inherit.unwrap_or(true),
            },
        );
    }

    for schema in &graph.schemas {
        if schema != DEFAULT_SCHEMA && config.includes_schema(Some(schema)) {
            snapshot.schemas.insert(schema.clone(), schema.clone());
        }
    }

    debug!(
        tables = snapshot.tables.len(),
        views = snapshot.views.len(),
        enums = snapshot.enums.len(),
        sequences = snapshot.sequences.len(),
        policies = snapshot.policies.len(),
        skipped_policies = report.skipped_policies.len(),
        "Snapshot generated"
    );

    Ok((snapshot, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnapshotError;
    use crate::models::{
        ColumnDescriptor, DefaultValue, EnumDescriptor, EnumTypeRef, IdentityDescriptor,
        IdentityKind, IndexDescriptor, IndexMember, LiteralValue, PolicyDescriptor,
        RoleDescriptor, SequenceDescriptor, TableDescriptor, TableRef, ViewDescriptor,
    };
    use crate::snapshot::Casing;
    use pretty_assertions::assert_eq;
    use serde_json::Number;

    fn table(name: &str, schema: Option<&str>, columns: Vec<ColumnDescriptor>) -> TableDescriptor {
        let mut table = TableDescriptor::new(name);
        table.schema = schema.map(str::to_string);
        table.columns = columns;
        table
    }

    fn named_index(name: &str, column: &str) -> IndexDescriptor {
        IndexDescriptor {
            name: Some(name.to_string()),
            members: vec![IndexMember::column(column)],
            ..Default::default()
        }
    }

    fn sample_graph() -> SchemaObjectGraph {
        let mut id = ColumnDescriptor::new("id", "integer");
        id.primary = true;
        id.not_null = true;
        id.identity = Some(IdentityDescriptor {
            kind: IdentityKind::Always,
            sequence_name: None,
            options: None,
        });
        let mut tags = ColumnDescriptor::new("tags", "integer[]");
        tags.default = Some(DefaultValue::Literal(LiteralValue::Array(
            [1, 2, 3]
                .iter()
                .map(|n| LiteralValue::Number(Number::from(*n)))
                .collect(),
        )));
        let mut created_at = ColumnDescriptor::new("createdAt", "timestamp");
        created_at.key_as_name = true;

        let mut users = table("users", None, vec![id, tags, created_at]);
        users.indexes = vec![IndexDescriptor {
            members: vec![IndexMember::column("id"), IndexMember::column("createdAt")],
            ..Default::default()
        }];

        SchemaObjectGraph {
            tables: vec![users],
            views: vec![ViewDescriptor::new("recent_users")],
            enums: vec![EnumDescriptor {
                name: "mood".to_string(),
                schema: None,
                values: vec!["sad".to_string(), "happy".to_string()],
            }],
            sequences: vec![SequenceDescriptor {
                name: "invoice_no".to_string(),
                schema: None,
                options: None,
            }],
            roles: vec![
                RoleDescriptor {
                    name: "admin".to_string(),
                    create_db: Some(true),
                    ..Default::default()
                },
                RoleDescriptor {
                    name: "postgres".to_string(),
                    is_existing: true,
                    ..Default::default()
                },
            ],
            schemas: vec!["public".to_string(), "audit".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_full_conversion() {
        let config = SnapshotConfig {
            casing: Some(Casing::SnakeCase),
            ..Default::default()
        };
        let snapshot = generate_snapshot(&sample_graph(), &config).unwrap();

        let users = &snapshot.tables["public.users"];
        assert_eq!(users.columns["tags"].default.as_deref(), Some("'{1,2,3}'"));
        assert!(users.columns.contains_key("created_at"));
        assert!(users.indexes.contains_key("users_id_created_at_index"));
        assert_eq!(users.columns["id"].identity.as_ref().map(|i| i.max_value.as_str()), Some("2147483647"));

        let sequence = &snapshot.sequences["public.invoice_no"];
        assert_eq!(sequence.max_value, "9223372036854775807");
        assert_eq!(sequence.min_value, "1");

        assert_eq!(snapshot.enums["public.mood"].values, vec!["sad", "happy"]);
        assert!(snapshot.views.contains_key("public.recent_users"));
        assert_eq!(snapshot.roles.keys().collect::<Vec<_>>(), vec!["admin"]);
        assert!(snapshot.roles["admin"].inherit);
        assert!(snapshot.roles["admin"].create_db);
        assert_eq!(snapshot.schemas.keys().collect::<Vec<_>>(), vec!["audit"]);
    }

    #[test]
    fn test_output_is_deterministic() {
        let graph = sample_graph();
        let config = SnapshotConfig::default();

        let first = generate_snapshot(&graph, &config).unwrap();
        let second = generate_snapshot(&graph, &config).unwrap();

        assert_eq!(first.to_json_pretty().unwrap(), second.to_json_pretty().unwrap());
        assert_eq!(first.checksum().unwrap(), second.checksum().unwrap());
    }

    #[test]
    fn test_provider_and_project_id() {
        let config = SnapshotConfig {
            provider: Some("neon".to_string()),
            project_id: Some("p1".to_string()),
            ..Default::default()
        };
        let snapshot = generate_snapshot(&SchemaObjectGraph::default(), &config).unwrap();

        assert_eq!(snapshot.provider.as_deref(), Some("neon"));
        assert_eq!(snapshot.project_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_index_collision_across_tables_in_one_schema() {
        let mut a = table("a", None, vec![ColumnDescriptor::new("x", "integer")]);
        a.indexes = vec![named_index("idx1", "x")];
        let mut b = table("b", None, vec![ColumnDescriptor::new("x", "integer")]);
        b.indexes = vec![named_index("idx1", "x")];

        let graph = SchemaObjectGraph {
            tables: vec![a, b],
            ..Default::default()
        };
        let err = generate_snapshot(&graph, &SnapshotConfig::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateIndexName { ref name, .. } if name == "idx1"));
    }

    #[test]
    fn test_same_index_name_in_different_schemas() {
        let mut a = table("a", None, vec![ColumnDescriptor::new("x", "integer")]);
        a.indexes = vec![named_index("idx1", "x")];
        let mut b = table("b", Some("audit"), vec![ColumnDescriptor::new("x", "integer")]);
        b.indexes = vec![named_index("idx1", "x")];

        let graph = SchemaObjectGraph {
            tables: vec![a, b],
            ..Default::default()
        };
        let snapshot = generate_snapshot(&graph, &SnapshotConfig::default()).unwrap();
        assert_eq!(snapshot.tables.len(), 2);
        assert_eq!(snapshot.tables["audit.b"].schema, "audit");
    }

    #[test]
    fn test_schema_filter_excludes_tables_and_their_collisions() {
        let mut a = table("a", None, vec![ColumnDescriptor::new("x", "integer")]);
        a.indexes = vec![named_index("idx1", "x")];
        let mut b = table("b", None, vec![ColumnDescriptor::new("x", "integer")]);
        b.indexes = vec![named_index("idx1", "x")];
        let mut c = table("c", Some("audit"), vec![ColumnDescriptor::new("x", "integer")]);
        c.indexes = vec![named_index("idx1", "x")];

        let graph = SchemaObjectGraph {
            tables: vec![a, b, c],
            ..Default::default()
        };
        let config = SnapshotConfig {
            schema_filter: Some(vec!["audit".to_string()]),
            ..Default::default()
        };

        let (snapshot, report) = generate_snapshot_with_report(&graph, &config).unwrap();
        assert_eq!(snapshot.tables.keys().collect::<Vec<_>>(), vec!["audit.c"]);
        assert_eq!(report.skipped_tables, vec!["public.a".to_string(), "public.b".to_string()]);
    }

    #[test]
    fn test_schema_filter_keeps_types_used_by_kept_tables() {
        let mut status = ColumnDescriptor::new("status", "status");
        status.enum_type = Some(EnumTypeRef {
            name: "status".to_string(),
            schema: Some("types".to_string()),
        });
        let graph = SchemaObjectGraph {
            tables: vec![table("orders", None, vec![status])],
            enums: vec![EnumDescriptor {
                name: "status".to_string(),
                schema: Some("types".to_string()),
                values: vec!["open".to_string(), "closed".to_string()],
            }],
            sequences: vec![SequenceDescriptor {
                name: "order_no".to_string(),
                schema: Some("types".to_string()),
                options: None,
            }],
            schemas: vec!["types".to_string()],
            ..Default::default()
        };
        let config = SnapshotConfig {
            schema_filter: Some(vec!["public".to_string()]),
            ..Default::default()
        };

        let snapshot = generate_snapshot(&graph, &config).unwrap();
        assert!(snapshot.tables.contains_key("public.orders"));
        assert_eq!(snapshot.enums["types.status"].values, vec!["open", "closed"]);
        assert!(snapshot.sequences.contains_key("types.order_no"));
        assert!(snapshot.schemas.is_empty());
    }

    #[test]
    fn test_unlinked_policy_is_reported() {
        let mut linked = PolicyDescriptor::new("linked");
        linked.linked_table = Some(TableRef::new("users"));
        let graph = SchemaObjectGraph {
            tables: vec![table("users", None, vec![])],
            policies: vec![PolicyDescriptor::new("orphan"), linked],
            ..Default::default()
        };

        let (snapshot, report) = generate_snapshot_with_report(&graph, &SnapshotConfig::default()).unwrap();

        assert_eq!(report.skipped_policies, vec!["orphan".to_string()]);
        assert!(snapshot.tables["public.users"].policies.contains_key("linked"));
        assert!(snapshot.policies.is_empty());
    }

    #[test]
    fn test_linked_policy_collides_with_inline_policy() {
        let mut users = table("users", None, vec![]);
        users.policies = vec![PolicyDescriptor::new("p")];
        let mut linked = PolicyDescriptor::new("p");
        linked.linked_table = Some(TableRef::new("users"));

        let graph = SchemaObjectGraph {
            tables: vec![users],
            policies: vec![linked],
            ..Default::default()
        };
        let err = generate_snapshot(&graph, &SnapshotConfig::default()).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicatePolicyName { .. }));
    }

    #[test]
    fn test_first_enum_declaration_wins() {
        let graph = SchemaObjectGraph {
            enums: vec![
                EnumDescriptor {
                    name: "mood".to_string(),
                    schema: None,
                    values: vec!["sad".to_string()],
                },
                EnumDescriptor {
                    name: "mood".to_string(),
                    schema: Some("public".to_string()),
                    values: vec!["happy".to_string()],
                },
            ],
            ..Default::default()
        };

        let (snapshot, report) = generate_snapshot_with_report(&graph, &SnapshotConfig::default()).unwrap();
        assert_eq!(snapshot.enums["public.mood"].values, vec!["sad"]);
        assert_eq!(report.ignored_enums, vec!["public.mood".to_string()]);
    }

    #[test]
    fn test_identical_sequence_redeclaration_is_silent() {
        let sequence = SequenceDescriptor {
            name: "s".to_string(),
            schema: None,
            options: None,
        };
        let graph = SchemaObjectGraph {
            sequences: vec![sequence.clone(), sequence],
            ..Default::default()
        };

        let (snapshot, report) = generate_snapshot_with_report(&graph, &SnapshotConfig::default()).unwrap();
        assert_eq!(snapshot.sequences.len(), 1);
        assert!(report.ignored_sequences.is_empty());
    }
}
