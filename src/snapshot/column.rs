//! Column mapping

use super::casing::{column_name, Casing};
use super::registry::UniqueRegistry;
use super::resolver::{identity_bounds_for, literal_for_value, resolve_sequence_options};
use super::types::{Column, ColumnLab, GeneratedColumn, GeneratedKind, Identity, UniqueConstraint};
use crate::error::SnapshotResult;
use crate::models::{ColumnDescriptor, DefaultValue, UniqueType, DEFAULT_SCHEMA};

/// Owner of the columns being mapped
#[derive(Debug, Clone, Copy)]
pub struct ColumnContext<'a> {
    pub table: &'a str,
    pub schema: Option<&'a str>,
    pub casing: Option<Casing>,
}

/// A mapped column plus the unique constraint it declares, if any
#[derive(Debug, Clone, PartialEq)]
pub struct MappedColumn {
    pub column: Column,
    pub unique: Option<UniqueConstraint>,
}

pub fn unique_key_name(table: &str, columns: &[String]) -> String {
    format!("{}_{}_unique", table, columns.join("_"))
}

fn encode_default(default: &DefaultValue, sql_type: &str) -> String {
    match default {
        DefaultValue::RawSql(sql) => sql.clone(),
        DefaultValue::Literal(value) => literal_for_value(value, sql_type),
    }
}

fn lab_for(desc: &ColumnDescriptor) -> Option<ColumnLab> {
    let lab = ColumnLab {
        description: desc.description.clone(),
        enum_values: desc.enum_values.clone(),
        default_fn: desc.default_fn_source.clone(),
        on_update_fn: desc.on_update_fn_source.clone(),
        json_shape: desc.json_shape.clone(),
    };
    (!lab.is_empty()).then_some(lab)
}

/// Map one declared column, registering its column-level unique constraint
pub fn map_column(
    desc: &ColumnDescriptor,
    ctx: ColumnContext<'_>,
    uniques: &mut UniqueRegistry,
) -> SnapshotResult<MappedColumn> {
    let name = column_name(desc, ctx.casing);

    let identity = desc.identity.as_ref().map(|identity| {
        let resolved = resolve_sequence_options(
            identity.options.as_ref(),
            identity_bounds_for(&desc.sql_type),
        );
        Identity {
            kind: identity.kind,
            name: identity
                .sequence_name
                .clone()
                .unwrap_or_else(|| format!("{}_{}_seq", ctx.table, name)),
            schema: ctx.schema.unwrap_or(DEFAULT_SCHEMA).to_string(),
            increment: resolved.increment,
            start_with: resolved.start_with,
            min_value: resolved.min_value,
            max_value: resolved.max_value,
            cache: resolved.cache,
            cycle: resolved.cycle,
        }
    });

    let column = Column {
        name: name.clone(),
        sql_type: desc.sql_type.clone(),
        type_schema: desc
            .enum_type
            .as_ref()
            .map(|e| e.schema.clone().unwrap_or_else(|| DEFAULT_SCHEMA.to_string())),
        primary_key: desc.primary,
        not_null: desc.not_null,
        default: desc
            .default
            .as_ref()
            .map(|d| encode_default(d, &desc.sql_type)),
        generated: desc.generated.as_ref().map(|g| GeneratedColumn {
            expression: g.to_sql(),
            kind: GeneratedKind::Stored,
        }),
        identity,
        lab: lab_for(desc),
    };

    let unique = if desc.is_unique {
        let columns = vec![name];
        let unique_name = desc
            .unique_name
            .clone()
            .unwrap_or_else(|| unique_key_name(ctx.table, &columns));
        uniques.register(&unique_name, &columns)?;
        Some(UniqueConstraint {
            name: unique_name,
            nulls_not_distinct: desc.unique_type == Some(UniqueType::NotDistinct),
            columns,
        })
    } else {
        None
    };

    Ok(MappedColumn { column, unique })
}
