//! Schema Introspection Module
//!
//! Reads the catalog of a live PostgreSQL database back into a
//! [`SchemaObjectGraph`] and serializes it like any declared schema, so a
//! snapshot taken from a SQL dump has the same shape as one taken from code.
//! Defaults, checks and generated expressions come back as raw SQL.

use crate::config::SnapshotConfig;
use crate::error::IngestError;
use crate::ingest::{CatalogIntrospector, PostgresEngine};
use crate::models::{
    CheckDescriptor, ColumnDescriptor, DefaultValue, EnumDescriptor, EnumTypeRef,
    ForeignKeyDescriptor, GeneratedExpression, IdentityDescriptor, IdentityKind, IndexDescriptor,
    IndexMember, IndexedColumn, NullsOrder, NumericField, PolicyAs, PolicyDescriptor, PolicyFor,
    PolicyTarget, PolicyTo, PrimaryKeyDescriptor, ReferentialAction, SchemaObjectGraph,
    SelectedField, SequenceDescriptor, SequenceOptions, SortOrder, TableDescriptor, TableRef,
    UniqueConstraintDescriptor, ViewDescriptor, DEFAULT_SCHEMA,
};
use crate::snapshot::{generate_snapshot, Snapshot};
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use tokio_postgres::Client;
use tracing::debug;

/// Introspects the scratch engine after a dump was materialized
#[derive(Debug, Clone, Default)]
pub struct PgCatalogIntrospector {
    config: SnapshotConfig,
}

impl PgCatalogIntrospector {
    pub fn new(config: SnapshotConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl CatalogIntrospector<PostgresEngine> for PgCatalogIntrospector {
    async fn introspect(&self, engine: &mut PostgresEngine, schemas: &[String]) -> Result<Snapshot, IngestError> {
        let graph = introspect_graph(engine.client(), schemas).await?;
        Ok(generate_snapshot(&graph, &self.config)?)
    }
}

type TableKey = (String, String);

/// `None` for the default schema so introspected tables serialize like declared ones
fn declared_schema(schema: &str) -> Option<String> {
    (schema != DEFAULT_SCHEMA).then(|| schema.to_string())
}

/// Read every supported object of `schemas` into a graph
pub async fn introspect_graph(client: &Client, schemas: &[String]) -> Result<SchemaObjectGraph, IngestError> {
    let mut tables = get_tables(client, schemas).await?;
    let mut views = get_views(client, schemas).await?;

    get_columns(client, schemas, &mut tables, &mut views).await?;
    get_constraints(client, schemas, &mut tables).await?;
    get_indexes(client, schemas, &mut tables).await?;
    get_policies(client, schemas, &mut tables).await?;

    let graph = SchemaObjectGraph {
        tables: tables.into_values().collect(),
        views: views.into_values().collect(),
        enums: get_enums(client, schemas).await?,
        sequences: get_sequences(client, schemas).await?,
        schemas: get_schemas(client, schemas).await?,
        ..Default::default()
    };

    debug!(
        "Introspected {} tables, {} views, {} enums, {} sequences",
        graph.tables.len(),
        graph.views.len(),
        graph.enums.len(),
        graph.sequences.len()
    );

    Ok(graph)
}

/// Get all tables with their RLS flag
async fn get_tables(client: &Client, schemas: &[String]) -> Result<IndexMap<TableKey, TableDescriptor>, IngestError> {
    let query = r#"
        SELECT
            n.nspname AS schema_name,
            c.relname AS table_name,
            c.relrowsecurity AS rls_enabled,
            obj_description(c.oid, 'pg_class') AS description
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE c.relkind IN ('r', 'p')
          AND n.nspname = ANY($1)
        ORDER BY n.nspname, c.relname
    "#;

    let rows = client.query(query, &[&schemas]).await?;

    let mut tables = IndexMap::new();
    for row in rows {
        let schema: String = row.try_get("schema_name")?;
        let name: String = row.try_get("table_name")?;

        let mut table = TableDescriptor::new(name.clone());
        table.schema = declared_schema(&schema);
        table.enable_rls = row.try_get("rls_enabled")?;
        table.description = row.try_get("description")?;
        tables.insert((schema, name), table);
    }
    Ok(tables)
}

/// Get views and materialized views
async fn get_views(client: &Client, schemas: &[String]) -> Result<IndexMap<TableKey, ViewDescriptor>, IngestError> {
    let query = r#"
        SELECT
            n.nspname AS schema_name,
            c.relname AS view_name,
            c.relkind = 'm' AS materialized,
            pg_get_viewdef(c.oid, true) AS definition,
            ts.spcname::text AS tablespace,
            am.amname::text AS access_method,
            NOT c.relispopulated AS with_no_data,
            c.reloptions::text[] AS options
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        LEFT JOIN pg_tablespace ts ON ts.oid = c.reltablespace
        LEFT JOIN pg_am am ON am.oid = c.relam
        WHERE c.relkind IN ('v', 'm')
          AND n.nspname = ANY($1)
        ORDER BY n.nspname, c.relname
    "#;

    let rows = client.query(query, &[&schemas]).await?;

    let mut views = IndexMap::new();
    for row in rows {
        let schema: String = row.try_get("schema_name")?;
        let name: String = row.try_get("view_name")?;
        let materialized: bool = row.try_get("materialized")?;
        let definition: Option<String> = row.try_get("definition")?;
        let options: Option<Vec<String>> = row.try_get("options")?;

        let mut view = ViewDescriptor::new(name.clone());
        view.schema = declared_schema(&schema);
        view.query = definition.map(|d| d.trim().trim_end_matches(';').to_string());
        view.materialized = materialized;
        view.with_options = options.map(|o| parse_reloptions(&o)).filter(|o| !o.is_empty());
        if materialized {
            view.tablespace = row.try_get("tablespace")?;
            view.using = row.try_get("access_method")?;
            view.with_no_data = Some(row.try_get("with_no_data")?);
        }
        views.insert((schema, name), view);
    }
    Ok(views)
}

/// Get columns of every table and view, in attribute order
async fn get_columns(
    client: &Client,
    schemas: &[String],
    tables: &mut IndexMap<TableKey, TableDescriptor>,
    views: &mut IndexMap<TableKey, ViewDescriptor>,
) -> Result<(), IngestError> {
    let query = r#"
        SELECT
            n.nspname AS schema_name,
            c.relname AS table_name,
            a.attname::text AS column_name,
            format_type(a.atttypid, a.atttypmod) AS data_type,
            a.attnotnull AS not_null,
            pg_get_expr(d.adbin, d.adrelid) AS default_expr,
            a.attidentity::text AS identity,
            a.attgenerated::text AS generated,
            t.typtype::text AS type_kind,
            t.typname::text AS type_name,
            tn.nspname::text AS type_schema,
            col_description(c.oid, a.attnum) AS description,
            seq.relname::text AS sequence_name,
            s.seqincrement::text AS seq_increment,
            s.seqmin::text AS seq_min,
            s.seqmax::text AS seq_max,
            s.seqstart::text AS seq_start,
            s.seqcache::text AS seq_cache,
            s.seqcycle AS seq_cycle
        FROM pg_attribute a
        JOIN pg_class c ON c.oid = a.attrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        JOIN pg_type t ON t.oid = a.atttypid
        JOIN pg_namespace tn ON tn.oid = t.typnamespace
        LEFT JOIN pg_attrdef d ON d.adrelid = a.attrelid AND d.adnum = a.attnum
        LEFT JOIN pg_sequence s ON a.attidentity <> ''
            AND s.seqrelid = pg_get_serial_sequence(format('%I.%I', n.nspname, c.relname), a.attname)::regclass
        LEFT JOIN pg_class seq ON seq.oid = s.seqrelid
        WHERE c.relkind IN ('r', 'p', 'v', 'm')
          AND a.attnum > 0
          AND NOT a.attisdropped
          AND n.nspname = ANY($1)
        ORDER BY n.nspname, c.relname, a.attnum
    "#;

    let rows = client.query(query, &[&schemas]).await?;

    for row in rows {
        let key: TableKey = (row.try_get("schema_name")?, row.try_get("table_name")?);
        let name: String = row.try_get("column_name")?;
        let type_kind: String = row.try_get("type_kind")?;
        let default_expr: Option<String> = row.try_get("default_expr")?;
        let generated: String = row.try_get("generated")?;
        let identity: String = row.try_get("identity")?;

        let mut column = if type_kind == "e" {
            let type_name: String = row.try_get("type_name")?;
            let type_schema: String = row.try_get("type_schema")?;
            let mut column = ColumnDescriptor::new(name, type_name.clone());
            column.enum_type = Some(EnumTypeRef {
                name: type_name,
                schema: declared_schema(&type_schema),
            });
            column
        } else {
            ColumnDescriptor::new(name, row.try_get::<_, String>("data_type")?)
        };

        column.not_null = row.try_get("not_null")?;
        column.description = row.try_get("description")?;

        if generated == "s" {
            column.generated = default_expr.map(GeneratedExpression::Sql);
        } else {
            column.default = default_expr.map(DefaultValue::RawSql);
        }

        if let Some(kind) = identity_kind_from_catalog(&identity) {
            let text = |col: &str| -> Result<Option<NumericField>, IngestError> {
                Ok(row.try_get::<_, Option<String>>(col)?.map(NumericField::Text))
            };
            column.identity = Some(IdentityDescriptor {
                kind,
                sequence_name: row.try_get("sequence_name")?,
                options: Some(SequenceOptions {
                    increment: text("seq_increment")?,
                    min_value: text("seq_min")?,
                    max_value: text("seq_max")?,
                    start_with: text("seq_start")?,
                    cache: text("seq_cache")?,
                    cycle: row.try_get("seq_cycle")?,
                }),
            });
        }

        if let Some(table) = tables.get_mut(&key) {
            table.columns.push(column);
        } else if let Some(view) = views.get_mut(&key) {
            view.selected_fields.push(SelectedField::Column(column));
        }
    }
    Ok(())
}

/// Get primary keys, uniques, foreign keys and checks
async fn get_constraints(
    client: &Client,
    schemas: &[String],
    tables: &mut IndexMap<TableKey, TableDescriptor>,
) -> Result<(), IngestError> {
    let query = r#"
        SELECT
            n.nspname AS schema_name,
            c.relname AS table_name,
            con.conname::text AS constraint_name,
            con.contype::text AS kind,
            ARRAY(
                SELECT a.attname::text
                FROM unnest(con.conkey) WITH ORDINALITY AS k(attnum, ord)
                JOIN pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
                ORDER BY k.ord
            ) AS columns,
            fn.nspname::text AS foreign_schema,
            fc.relname::text AS foreign_table,
            ARRAY(
                SELECT a.attname::text
                FROM unnest(con.confkey) WITH ORDINALITY AS k(attnum, ord)
                JOIN pg_attribute a ON a.attrelid = con.confrelid AND a.attnum = k.attnum
                ORDER BY k.ord
            ) AS foreign_columns,
            con.confdeltype::text AS on_delete,
            con.confupdtype::text AS on_update,
            pg_get_constraintdef(con.oid) AS definition
        FROM pg_constraint con
        JOIN pg_class c ON c.oid = con.conrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        LEFT JOIN pg_class fc ON fc.oid = con.confrelid
        LEFT JOIN pg_namespace fn ON fn.oid = fc.relnamespace
        WHERE con.contype IN ('p', 'u', 'f', 'c')
          AND n.nspname = ANY($1)
        ORDER BY n.nspname, c.relname, con.conname
    "#;

    let rows = client.query(query, &[&schemas]).await?;

    for row in rows {
        let key: TableKey = (row.try_get("schema_name")?, row.try_get("table_name")?);
        let Some(table) = tables.get_mut(&key) else {
            continue;
        };

        let name: String = row.try_get("constraint_name")?;
        let kind: String = row.try_get("kind")?;
        let columns: Vec<String> = row.try_get("columns")?;
        let definition: String = row.try_get("definition")?;

        match kind.as_str() {
            "p" if columns.len() == 1 => {
                if let Some(column) = table.columns.iter_mut().find(|c| c.name == columns[0]) {
                    column.primary = true;
                }
            }
            "p" => table.primary_keys.push(PrimaryKeyDescriptor {
                name: Some(name),
                columns,
            }),
            "u" => table.unique_constraints.push(UniqueConstraintDescriptor {
                name: Some(name),
                columns,
                nulls_not_distinct: definition.to_uppercase().contains("NULLS NOT DISTINCT"),
            }),
            "f" => {
                let foreign_schema: Option<String> = row.try_get("foreign_schema")?;
                let foreign_table: Option<String> = row.try_get("foreign_table")?;
                let on_delete: String = row.try_get("on_delete")?;
                let on_update: String = row.try_get("on_update")?;

                let mut target = TableRef::new(foreign_table.unwrap_or_default());
                target.schema = foreign_schema.as_deref().and_then(declared_schema);

                table.foreign_keys.push(ForeignKeyDescriptor {
                    name: Some(name),
                    columns,
                    foreign_table: target,
                    foreign_columns: row.try_get("foreign_columns")?,
                    on_delete: ReferentialAction::from_catalog_code(&on_delete),
                    on_update: ReferentialAction::from_catalog_code(&on_update),
                });
            }
            "c" => table.checks.push(CheckDescriptor {
                name,
                value: check_body(&definition),
            }),
            _ => {}
        }
    }
    Ok(())
}

/// Get indexes that do not back a constraint
async fn get_indexes(
    client: &Client,
    schemas: &[String],
    tables: &mut IndexMap<TableKey, TableDescriptor>,
) -> Result<(), IngestError> {
    let query = r#"
        SELECT
            n.nspname AS schema_name,
            t.relname AS table_name,
            i.relname::text AS index_name,
            ix.indisunique AS is_unique,
            am.amname::text AS method,
            pg_get_expr(ix.indpred, ix.indrelid) AS predicate,
            ARRAY(
                SELECT pg_get_indexdef(ix.indexrelid, k, true)
                FROM generate_series(1, ix.indnkeyatts::int) AS k ORDER BY k
            ) AS members,
            ARRAY(
                SELECT ix.indkey[k - 1] = 0
                FROM generate_series(1, ix.indnkeyatts::int) AS k ORDER BY k
            ) AS is_expression,
            ARRAY(
                SELECT (ix.indoption[k - 1]::int & 1) = 1
                FROM generate_series(1, ix.indnkeyatts::int) AS k ORDER BY k
            ) AS descending,
            ARRAY(
                SELECT (ix.indoption[k - 1]::int & 2) = 2
                FROM generate_series(1, ix.indnkeyatts::int) AS k ORDER BY k
            ) AS nulls_first,
            ARRAY(
                SELECT CASE WHEN opc.opcdefault THEN NULL ELSE opc.opcname::text END
                FROM generate_series(1, ix.indnkeyatts::int) AS k
                JOIN pg_opclass opc ON opc.oid = ix.indclass[k - 1]
                ORDER BY k
            ) AS opclasses,
            i.reloptions::text[] AS options
        FROM pg_index ix
        JOIN pg_class t ON t.oid = ix.indrelid
        JOIN pg_class i ON i.oid = ix.indexrelid
        JOIN pg_namespace n ON n.oid = t.relnamespace
        JOIN pg_am am ON am.oid = i.relam
        WHERE n.nspname = ANY($1)
          AND NOT ix.indisprimary
          AND NOT EXISTS (
              SELECT 1 FROM pg_constraint con
              WHERE con.conindid = ix.indexrelid AND con.contype IN ('p', 'u', 'x')
          )
        ORDER BY n.nspname, t.relname, i.relname
    "#;

    let rows = client.query(query, &[&schemas]).await?;

    for row in rows {
        let key: TableKey = (row.try_get("schema_name")?, row.try_get("table_name")?);
        let Some(table) = tables.get_mut(&key) else {
            continue;
        };

        let members: Vec<String> = row.try_get("members")?;
        let is_expression: Vec<bool> = row.try_get("is_expression")?;
        let descending: Vec<bool> = row.try_get("descending")?;
        let nulls_first: Vec<bool> = row.try_get("nulls_first")?;
        let opclasses: Vec<Option<String>> = row.try_get("opclasses")?;
        let options: Option<Vec<String>> = row.try_get("options")?;

        let members = members
            .into_iter()
            .enumerate()
            .map(|(i, member)| {
                if is_expression.get(i).copied().unwrap_or(false) {
                    return IndexMember::Expression(member);
                }
                IndexMember::Column(IndexedColumn {
                    name: unquote_ident(&member),
                    order: Some(if descending.get(i).copied().unwrap_or(false) {
                        SortOrder::Desc
                    } else {
                        SortOrder::Asc
                    }),
                    nulls: Some(if nulls_first.get(i).copied().unwrap_or(false) {
                        NullsOrder::First
                    } else {
                        NullsOrder::Last
                    }),
                    opclass: opclasses.get(i).cloned().flatten(),
                })
            })
            .collect();

        table.indexes.push(IndexDescriptor {
            name: Some(row.try_get("index_name")?),
            members,
            unique: row.try_get("is_unique")?,
            where_clause: row.try_get("predicate")?,
            concurrently: false,
            method: Some(row.try_get("method")?),
            with_params: options.map(|o| parse_reloptions(&o)).unwrap_or_default(),
        });
    }
    Ok(())
}

/// Get RLS policies, attached to their table
async fn get_policies(
    client: &Client,
    schemas: &[String],
    tables: &mut IndexMap<TableKey, TableDescriptor>,
) -> Result<(), IngestError> {
    let query = r#"
        SELECT
            schemaname::text AS schema_name,
            tablename::text AS table_name,
            policyname::text AS policy_name,
            permissive AS as_kind,
            roles::text[] AS roles,
            cmd AS command,
            qual AS using_expr,
            with_check AS with_check_expr
        FROM pg_policies
        WHERE schemaname = ANY($1)
        ORDER BY schemaname, tablename, policyname
    "#;

    let rows = client.query(query, &[&schemas]).await?;

    for row in rows {
        let key: TableKey = (row.try_get("schema_name")?, row.try_get("table_name")?);
        let Some(table) = tables.get_mut(&key) else {
            continue;
        };

        let as_kind: String = row.try_get("as_kind")?;
        let command: String = row.try_get("command")?;
        let roles: Vec<String> = row.try_get("roles")?;

        let mut policy = PolicyDescriptor::new(row.try_get::<_, String>("policy_name")?);
        policy.as_kind = parse_catalog_enum::<PolicyAs>(&as_kind);
        policy.for_command = parse_catalog_enum::<PolicyFor>(&command);
        policy.to = Some(PolicyTo::Many(roles.into_iter().map(PolicyTarget::RoleName).collect()));
        policy.using = row.try_get("using_expr")?;
        policy.with_check = row.try_get("with_check_expr")?;
        table.policies.push(policy);
    }
    Ok(())
}

/// Get enum types with their labels in sort order
async fn get_enums(client: &Client, schemas: &[String]) -> Result<Vec<EnumDescriptor>, IngestError> {
    let query = r#"
        SELECT
            n.nspname::text AS schema_name,
            t.typname::text AS enum_name,
            ARRAY(
                SELECT e.enumlabel::text FROM pg_enum e
                WHERE e.enumtypid = t.oid
                ORDER BY e.enumsortorder
            ) AS labels
        FROM pg_type t
        JOIN pg_namespace n ON n.oid = t.typnamespace
        WHERE t.typtype = 'e'
          AND n.nspname = ANY($1)
        ORDER BY n.nspname, t.typname
    "#;

    let rows = client.query(query, &[&schemas]).await?;

    rows.iter()
        .map(|row| -> Result<EnumDescriptor, IngestError> {
            let schema: String = row.try_get("schema_name")?;
            Ok(EnumDescriptor {
                name: row.try_get("enum_name")?,
                schema: declared_schema(&schema),
                values: row.try_get("labels")?,
            })
        })
        .collect()
}

/// Get sequences not owned by an identity or serial column
async fn get_sequences(client: &Client, schemas: &[String]) -> Result<Vec<SequenceDescriptor>, IngestError> {
    let query = r#"
        SELECT
            n.nspname::text AS schema_name,
            c.relname::text AS sequence_name,
            s.seqincrement::text AS increment,
            s.seqmin::text AS min_value,
            s.seqmax::text AS max_value,
            s.seqstart::text AS start_with,
            s.seqcache::text AS cache,
            s.seqcycle AS cycle
        FROM pg_sequence s
        JOIN pg_class c ON c.oid = s.seqrelid
        JOIN pg_namespace n ON n.oid = c.relnamespace
        WHERE n.nspname = ANY($1)
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend d
              WHERE d.objid = s.seqrelid
                AND d.classid = 'pg_class'::regclass
                AND d.deptype IN ('a', 'i')
          )
        ORDER BY n.nspname, c.relname
    "#;

    let rows = client.query(query, &[&schemas]).await?;

    rows.iter()
        .map(|row| -> Result<SequenceDescriptor, IngestError> {
            let schema: String = row.try_get("schema_name")?;
            let text = |col: &str| -> Result<Option<NumericField>, IngestError> {
                Ok(Some(NumericField::Text(row.try_get(col)?)))
            };
            Ok(SequenceDescriptor {
                name: row.try_get("sequence_name")?,
                schema: declared_schema(&schema),
                options: Some(SequenceOptions {
                    increment: text("increment")?,
                    min_value: text("min_value")?,
                    max_value: text("max_value")?,
                    start_with: text("start_with")?,
                    cache: text("cache")?,
                    cycle: Some(row.try_get("cycle")?),
                }),
            })
        })
        .collect()
}

/// Schemas that actually exist, in request order
async fn get_schemas(client: &Client, schemas: &[String]) -> Result<Vec<String>, IngestError> {
    let rows = client
        .query("SELECT nspname::text AS name FROM pg_namespace WHERE nspname = ANY($1)", &[&schemas])
        .await?;
    let existing: Vec<String> = rows
        .iter()
        .map(|row| row.try_get("name"))
        .collect::<Result<_, _>>()?;

    Ok(schemas.iter().filter(|s| existing.contains(s)).cloned().collect())
}

fn identity_kind_from_catalog(code: &str) -> Option<IdentityKind> {
    match code {
        "a" => Some(IdentityKind::Always),
        "d" => Some(IdentityKind::ByDefault),
        _ => None,
    }
}

/// Parse an uppercase catalog keyword (`PERMISSIVE`, `SELECT`, ...)
fn parse_catalog_enum<T: serde::de::DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_value(Value::String(raw.to_uppercase())).ok()
}

/// Expression inside `CHECK (...)` as printed by `pg_get_constraintdef`
fn check_body(definition: &str) -> String {
    let trimmed = definition.trim();
    let trimmed = trimmed.strip_suffix(" NOT VALID").unwrap_or(trimmed);
    let inner = trimmed.strip_prefix("CHECK ").unwrap_or(trimmed);
    inner
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(inner)
        .to_string()
}

fn unquote_ident(ident: &str) -> String {
    match ident.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => ident.to_string(),
    }
}

/// `["fillfactor=70", ...]` into an ordered option map
fn parse_reloptions(options: &[String]) -> IndexMap<String, Value> {
    options
        .iter()
        .filter_map(|opt| opt.split_once('='))
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_body() {
        assert_eq!(check_body("CHECK ((price > 0))"), "(price > 0)");
        assert_eq!(check_body("CHECK ((qty >= 0)) NOT VALID"), "(qty >= 0)");
    }

    #[test]
    fn test_unquote_ident() {
        assert_eq!(unquote_ident("\"userId\""), "userId");
        assert_eq!(unquote_ident("email"), "email");
        assert_eq!(unquote_ident("\"a\"\"b\""), "a\"b");
    }

    #[test]
    fn test_catalog_keywords() {
        assert_eq!(parse_catalog_enum::<PolicyAs>("RESTRICTIVE"), Some(PolicyAs::Restrictive));
        assert_eq!(parse_catalog_enum::<PolicyFor>("SELECT"), Some(PolicyFor::Select));
        assert_eq!(parse_catalog_enum::<PolicyFor>("TRUNCATE"), None);
        assert_eq!(identity_kind_from_catalog("d"), Some(IdentityKind::ByDefault));
        assert_eq!(identity_kind_from_catalog(""), None);
    }

    #[test]
    fn test_reloptions() {
        let options = parse_reloptions(&["fillfactor=70".to_string(), "bogus".to_string()]);
        assert_eq!(options.len(), 1);
        assert_eq!(options["fillfactor"], Value::String("70".to_string()));
    }

    #[test]
    fn test_public_schema_is_implicit() {
        assert_eq!(declared_schema("public"), None);
        assert_eq!(declared_schema("audit"), Some("audit".to_string()));
    }
}
