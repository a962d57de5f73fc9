use crate::error::{Result, RoutineError};
use crate::materialize::sink::SinkStream;
use crate::metadata::cache::bindings_for;
use crate::metadata::decl::TypeDecl;
use crate::metadata::resolver::TypeBindings;
use crate::protocol::{FromSql, SqlValue};
use std::fmt;
use std::sync::Arc;

/// Static binding description of a host type.
pub trait Describe {
    fn describe() -> TypeDecl;
}

/// Field access on a host instance, keyed by the field identity used in
/// its [`TypeDecl`].
pub trait Record {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>>;
    fn write_field(&mut self, field: &str, input: FieldInput) -> Result<()>;
}

/// Error for a field identity the record does not know.
pub fn unknown_field(type_name: &str, field: &str) -> RoutineError {
    RoutineError::Configuration(format!("{} has no field '{}'", type_name, field))
}

/// Current value of a host field.
pub enum FieldValue<'a> {
    Scalar(SqlValue),
    /// Table-valued field; `None` is a null sequence
    Rows(Option<RowSequence<'a>>),
}

impl<'a> FieldValue<'a> {
    pub fn scalar(value: impl Into<SqlValue>) -> Self {
        FieldValue::Scalar(value.into())
    }

    pub fn rows<T: Describe + Record + 'static>(items: &'a [T]) -> Self {
        FieldValue::Rows(Some(RowSequence::of(items)))
    }

    pub fn optional_rows<T: Describe + Record + 'static>(items: Option<&'a [T]>) -> Self {
        FieldValue::Rows(items.map(RowSequence::of))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Scalar(v) => v.kind(),
            FieldValue::Rows(_) => "row sequence",
        }
    }
}

impl From<SqlValue> for FieldValue<'_> {
    fn from(value: SqlValue) -> Self {
        FieldValue::Scalar(value)
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            FieldValue::Rows(None) => f.write_str("Rows(None)"),
            FieldValue::Rows(Some(seq)) => f
                .debug_struct("Rows")
                .field("element_type", &seq.element_type)
                .field("len", &seq.len())
                .finish(),
        }
    }
}

/// Borrowed elements of a table-valued field, with the element type's
/// bindings resolved on demand.
pub struct RowSequence<'a> {
    element_type: &'static str,
    resolve: fn() -> Result<Arc<TypeBindings>>,
    items: Vec<&'a dyn Record>,
}

impl<'a> RowSequence<'a> {
    pub fn of<T: Describe + Record + 'static>(items: &'a [T]) -> Self {
        Self {
            element_type: std::any::type_name::<T>(),
            resolve: bindings_for::<T>,
            items: items.iter().map(|item| item as &dyn Record).collect(),
        }
    }

    pub fn element_type(&self) -> &'static str {
        self.element_type
    }

    pub fn element_bindings(&self) -> Result<Arc<TypeBindings>> {
        (self.resolve)()
    }

    pub fn items(&self) -> &[&'a dyn Record] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Value handed to [`Record::write_field`].
#[derive(Debug)]
pub enum FieldInput {
    Value(SqlValue),
    Stream(SinkStream),
}

impl FieldInput {
    pub fn into_value<T: FromSql>(self) -> Result<T> {
        match self {
            FieldInput::Value(v) => T::from_sql(v),
            FieldInput::Stream(_) => Err(RoutineError::Mapping(format!(
                "a stream cannot be assigned to a {} field",
                std::any::type_name::<T>()
            ))),
        }
    }

    pub fn into_stream(self) -> Result<SinkStream> {
        match self {
            FieldInput::Stream(s) => Ok(s),
            FieldInput::Value(v) => Err(RoutineError::Mapping(format!(
                "expected a stream, got a {} value",
                v.kind()
            ))),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldInput::Value(SqlValue::Null))
    }
}

impl From<SqlValue> for FieldInput {
    fn from(value: SqlValue) -> Self {
        FieldInput::Value(value)
    }
}

/// Host type for routines that take no parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoParams;

impl Describe for NoParams {
    fn describe() -> TypeDecl {
        TypeDecl::new("NoParams")
    }
}

impl Record for NoParams {
    fn read_field(&self, field: &str) -> Result<FieldValue<'_>> {
        Err(unknown_field("NoParams", field))
    }

    fn write_field(&mut self, field: &str, _input: FieldInput) -> Result<()> {
        Err(unknown_field("NoParams", field))
    }
}
