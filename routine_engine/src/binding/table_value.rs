use crate::binding::layout::layout;
use crate::error::{Result, RoutineError};
use crate::metadata::{FieldBinding, FieldValue, RowSequence, TypeBindings, DEFAULT_SCHEMA};
use crate::protocol::{ColumnSpec, RowSetSchema, TableValue};

/// Builds the column layout of a table-valued parameter from the element
/// type's bindings.
pub fn build_schema(element: &TypeBindings) -> Result<RowSetSchema> {
    let ordered = layout(
        element.fields().iter().collect(),
        |b| b.ordinal,
        |b| b.field.to_string(),
    )?;

    let mut schema = RowSetSchema::new();
    for binding in ordered {
        if binding.is_table_valued() {
            return Err(RoutineError::UnsupportedFeature(format!(
                "column '{}' of {} is itself table-valued",
                binding.name, element.type_name
            )));
        }
        let column = ColumnSpec::with_defaults(
            binding.name.clone(),
            binding.db_type,
            binding.size,
            binding.precision,
            binding.scale,
        );
        schema.push(column, binding.field);
    }
    Ok(schema)
}

/// Encodes a non-empty sequence into a table value, one row per element in
/// sequence order.
pub fn encode(field: &FieldBinding, rows: &RowSequence<'_>) -> Result<TableValue> {
    let element = rows.element_bindings()?;
    let schema = build_schema(&element)?;

    let mut out = Vec::with_capacity(rows.len());
    for item in rows.items() {
        let mut row = Vec::with_capacity(schema.column_count());
        for (column, accessor) in schema.iter() {
            match item.read_field(accessor)? {
                FieldValue::Scalar(value) => row.push(value),
                FieldValue::Rows(_) => {
                    return Err(RoutineError::UnsupportedFeature(format!(
                        "column '{}' of {} holds a nested sequence",
                        column.name, element.type_name
                    )))
                }
            }
        }
        out.push(row);
    }

    log::debug!(
        "encoded table value field={} rows={} columns={}",
        field.name,
        out.len(),
        schema.column_count()
    );

    Ok(TableValue {
        type_name: qualified_type_name(field, &element),
        schema,
        rows: out,
    })
}

fn qualified_type_name(field: &FieldBinding, element: &TypeBindings) -> String {
    match &field.table_type {
        Some(t) => t.qualified_name_for(Some(element)),
        None => format!("{}.{}", DEFAULT_SCHEMA, field.field),
    }
}
