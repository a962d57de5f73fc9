use crate::protocol::types::DbType;
use crate::protocol::value::SqlValue;

pub const DEFAULT_VARIABLE_SIZE: u32 = 50;
pub const DEFAULT_DECIMAL_PRECISION: u8 = 10;
pub const DEFAULT_DECIMAL_SCALE: u8 = 2;

/// Column definition of a table-valued parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub db_type: DbType,
    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
}

impl ColumnSpec {
    /// Builds a column, filling the size/precision/scale defaults the
    /// database expects for variable-length and decimal types.
    pub fn with_defaults(
        name: impl Into<String>,
        db_type: Option<DbType>,
        size: Option<u32>,
        precision: Option<u8>,
        scale: Option<u8>,
    ) -> Self {
        let db_type = db_type.unwrap_or(DbType::Int);
        let size = if db_type.is_variable_length() {
            Some(size.unwrap_or(DEFAULT_VARIABLE_SIZE))
        } else {
            size
        };
        let (precision, scale) = if db_type.is_decimal() {
            (
                Some(precision.unwrap_or(DEFAULT_DECIMAL_PRECISION)),
                Some(scale.unwrap_or(DEFAULT_DECIMAL_SCALE)),
            )
        } else {
            (precision, scale)
        };
        Self {
            name: name.into(),
            db_type,
            size,
            precision,
            scale,
        }
    }
}

/// Column definitions paired 1:1 with the host fields they are read from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSetSchema {
    columns: Vec<ColumnSpec>,
    accessors: Vec<&'static str>,
}

impl RowSetSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, column: ColumnSpec, field: &'static str) {
        self.columns.push(column);
        self.accessors.push(field);
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn accessors(&self) -> &[&'static str] {
        &self.accessors
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnSpec, &'static str)> {
        self.columns.iter().zip(self.accessors.iter().copied())
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Encoded table-valued parameter: qualified row type, schema and rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TableValue {
    pub type_name: String,
    pub schema: RowSetSchema,
    pub rows: Vec<Vec<SqlValue>>,
}

impl TableValue {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.schema.column_count()
    }
}
