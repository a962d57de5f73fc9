use crate::binding::table_value::encode;
use crate::error::{Result, RoutineError};
use crate::metadata::{names_match, FieldBinding, FieldInput, FieldValue, Record, TypeBindings};
use crate::protocol::{Direction, OutputValue, ParamPayload, ParameterValue, SqlValue};

#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldMapEntry {
    name: String,
    field: &'static str,
    direction: Direction,
}

/// Binding name to host field map produced by one bind pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<FieldMapEntry>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, field: &'static str, direction: Direction) {
        self.entries.push(FieldMapEntry {
            name: name.into(),
            field,
            direction,
        });
    }

    /// Looks a returned parameter name up; case-insensitive, leading `@` ignored.
    pub fn field_for(&self, name: &str) -> Option<(&'static str, Direction)> {
        self.entries
            .iter()
            .find(|e| names_match(&e.name, name))
            .map(|e| (e.field, e.direction))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.entries.iter().map(|e| (e.name.as_str(), e.field))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundParameters {
    pub parameters: Vec<ParameterValue>,
    pub field_map: FieldMap,
}

/// Builds one parameter per binding, in binding order.
///
/// Without a host instance every parameter is the null marker.
pub fn bind(host: Option<&dyn Record>, bindings: &TypeBindings) -> Result<BoundParameters> {
    let mut parameters = Vec::with_capacity(bindings.len());
    let mut field_map = FieldMap::new();

    for binding in bindings.fields() {
        let (payload, type_name) = match host {
            Some(record) => payload_for(record, binding)?,
            None => (ParamPayload::Value(SqlValue::Null), declared_type_name(binding)),
        };

        parameters.push(ParameterValue {
            name: binding.name.clone(),
            direction: binding.direction,
            db_type: binding.db_type,
            type_name,
            size: binding.size,
            precision: binding.precision,
            scale: binding.scale,
            payload,
        });
        field_map.insert(binding.name.clone(), binding.field, binding.direction);
    }

    Ok(BoundParameters {
        parameters,
        field_map,
    })
}

fn declared_type_name(binding: &FieldBinding) -> Option<String> {
    match &binding.table_type {
        Some(t) => Some(t.qualified_name()),
        None => binding.user_type_name.clone(),
    }
}

/// Payload of one parameter and its type name. A table-valued field's row
/// type falls back to the element type it actually holds.
fn payload_for(
    record: &dyn Record,
    binding: &FieldBinding,
) -> Result<(ParamPayload, Option<String>)> {
    let value = record.read_field(binding.field)?;

    if let Some(table_type) = &binding.table_type {
        return match value {
            FieldValue::Scalar(SqlValue::Null) | FieldValue::Rows(None) => Ok((
                ParamPayload::Value(SqlValue::Null),
                declared_type_name(binding),
            )),
            FieldValue::Rows(Some(seq)) if seq.is_empty() => {
                let element = seq.element_bindings()?;
                Ok((
                    ParamPayload::Value(SqlValue::Null),
                    Some(table_type.qualified_name_for(Some(element.as_ref()))),
                ))
            }
            FieldValue::Rows(Some(seq)) => {
                let table = encode(binding, &seq)?;
                let type_name = Some(table.type_name.clone());
                Ok((ParamPayload::Table(table), type_name))
            }
            FieldValue::Scalar(other) => Err(RoutineError::type_mismatch(
                binding.field,
                format!(
                    "table-valued parameter '{}' needs a sequence, got a {} value",
                    binding.name,
                    other.kind()
                ),
            )),
        };
    }

    let payload = match value {
        FieldValue::Scalar(v) => ParamPayload::Value(v),
        FieldValue::Rows(None) => ParamPayload::Value(SqlValue::Null),
        FieldValue::Rows(Some(_)) => {
            return Err(RoutineError::type_mismatch(
                binding.field,
                format!(
                    "parameter '{}' is not declared table-valued but holds a sequence",
                    binding.name
                ),
            ))
        }
    };
    Ok((payload, binding.user_type_name.clone()))
}

/// Copies returned output values back onto the host through the field map.
///
/// Only out, in-out and return fields are written. Returns how many fields
/// were written.
pub fn replay_outputs(
    host: &mut dyn Record,
    map: &FieldMap,
    outputs: Vec<OutputValue>,
) -> Result<usize> {
    let mut written = 0;
    for output in outputs {
        let Some((field, direction)) = map.field_for(&output.name) else {
            log::debug!("ignoring output value name={} (no bound field)", output.name);
            continue;
        };
        if !direction.is_output() {
            log::debug!("ignoring output value name={} (input-only field)", output.name);
            continue;
        }
        host.write_field(field, FieldInput::Value(output.value))?;
        written += 1;
    }
    Ok(written)
}
