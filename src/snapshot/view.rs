//! View assembly

use super::column::{map_column, ColumnContext};
use super::registry::{Registries, UniqueRegistry};
use super::types::View;
use crate::config::SnapshotConfig;
use crate::error::SnapshotResult;
use crate::models::{SelectedField, ViewDescriptor};
use indexmap::IndexMap;

/// Build the snapshot entry of one view, keyed `schema.name`
pub fn assemble_view(
    desc: &ViewDescriptor,
    config: &SnapshotConfig,
    registries: &mut Registries,
) -> SnapshotResult<Option<(String, View)>> {
    if !config.includes_schema(desc.schema.as_deref()) {
        return Ok(None);
    }

    let schema = desc.schema_or_public();
    registries.views.register(schema, &desc.name)?;

    let ctx = ColumnContext {
        table: &desc.name,
        schema: desc.schema.as_deref(),
        casing: config.casing,
    };
    let mut uniques = UniqueRegistry::new(&desc.name);
    let mut columns = IndexMap::new();

    // expression projections carry no column definition
    for field in &desc.selected_fields {
        if let SelectedField::Column(column) = field {
            let mapped = map_column(column, ctx, &mut uniques)?;
            columns.insert(mapped.column.name.clone(), mapped.column);
        }
    }

    let materialized = desc.materialized;
    let view = View {
        name: desc.name.clone(),
        schema: schema.to_string(),
        columns,
        definition: if desc.is_existing {
            None
        } else {
            desc.query.clone()
        },
        materialized,
        is_existing: desc.is_existing,
        with_options: desc.with_options.clone(),
        tablespace: desc.tablespace.clone().filter(|_| materialized),
        using: desc.using.clone().filter(|_| materialized),
        with_no_data: desc.with_no_data.filter(|_| materialized),
    };

    Ok(Some((desc.qualified_name(), view)))
}
