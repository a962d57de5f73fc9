use crate::engine::cancellation::CancellationToken;
use crate::engine::executor::ResultCursor;
use crate::error::{Result, RoutineError};
use crate::materialize::matcher::{match_columns, ReadPlan};
use crate::materialize::sink::{deliver, SinkOptions};
use crate::metadata::{bindings_for, Describe, FieldBinding, FieldInput, Record, TypeBindings};
use crate::protocol::SqlValue;

/// Reads the current row of `cursor` into `target` following `plan`.
pub fn read_row(
    cursor: &mut dyn ResultCursor,
    plan: &ReadPlan,
    bindings: &TypeBindings,
    target: &mut dyn Record,
    options: &SinkOptions,
) -> Result<()> {
    for m in plan.matches() {
        let Some(binding) = bindings.get(m.binding) else {
            return Err(RoutineError::InternalError(format!(
                "read plan references binding {} of {}",
                m.binding, bindings.type_name
            )));
        };
        read_column(cursor, m.column, binding, target, options).map_err(|source| {
            RoutineError::ColumnRead {
                column: m.column_name.clone(),
                type_name: bindings.type_name.to_string(),
                source: Box::new(source),
            }
        })?;
    }
    Ok(())
}

fn read_column(
    cursor: &mut dyn ResultCursor,
    column: usize,
    binding: &FieldBinding,
    target: &mut dyn Record,
    options: &SinkOptions,
) -> Result<()> {
    let fetched = match &binding.stream {
        Some(spec) => deliver(spec, &*target, options, |sink| {
            cursor.copy_stream(column, sink)
        }),
        None => cursor.get_value(column).map(FieldInput::Value),
    };

    let input = match fetched {
        Ok(input) => input,
        Err(RoutineError::ColumnNotFound(name)) => {
            if !binding.optional_in_result {
                return Err(RoutineError::Mapping(format!(
                    "column '{}' for field '{}' is missing from the result",
                    name, binding.field
                )));
            }
            FieldInput::Value(SqlValue::Null)
        }
        Err(e) => return Err(e),
    };
    target.write_field(binding.field, input)
}

/// Materializes every remaining row of the current result set as `T`.
pub fn materialize_set<T>(
    cursor: &mut dyn ResultCursor,
    options: &SinkOptions,
    cancel: &CancellationToken,
) -> Result<Vec<T>>
where
    T: Describe + Record + Default + 'static,
{
    let bindings = bindings_for::<T>()?;
    let columns = cursor.columns()?;
    let plan = match_columns(&columns, &bindings);

    let mut rows = Vec::new();
    loop {
        cancel.check()?;
        if !cursor.next_row()? {
            break;
        }
        let mut instance = T::default();
        read_row(cursor, &plan, &bindings, &mut instance, options)?;
        rows.push(instance);
    }

    log::debug!(
        "materialized result set type={} rows={} mapped_columns={}",
        bindings.type_name,
        rows.len(),
        plan.len()
    );
    Ok(rows)
}
