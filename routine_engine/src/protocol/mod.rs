pub mod param_value;
pub mod table_value;
pub mod types;
pub mod value;

pub use param_value::{OutputValue, ParamPayload, ParameterValue};
pub use table_value::{
    ColumnSpec, RowSetSchema, TableValue, DEFAULT_DECIMAL_PRECISION, DEFAULT_DECIMAL_SCALE,
    DEFAULT_VARIABLE_SIZE,
};
pub use types::{DbType, Direction};
pub use value::{FromSql, SqlTimestamp, SqlValue};
