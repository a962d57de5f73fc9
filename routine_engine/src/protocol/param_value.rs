use crate::protocol::table_value::TableValue;
use crate::protocol::types::{DbType, Direction};
use crate::protocol::value::SqlValue;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamPayload {
    Value(SqlValue),
    Table(TableValue),
}

impl ParamPayload {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamPayload::Value(SqlValue::Null))
    }
}

/// One parameter of a routine call, built fresh for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterValue {
    pub name: String,
    pub direction: Direction,
    pub db_type: Option<DbType>,
    /// User-defined scalar type name, or the qualified row type for table values
    pub type_name: Option<String>,
    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub payload: ParamPayload,
}

impl ParameterValue {
    pub fn null(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
            db_type: None,
            type_name: None,
            size: None,
            precision: None,
            scale: None,
            payload: ParamPayload::Value(SqlValue::Null),
        }
    }

    pub fn is_null(&self) -> bool {
        self.payload.is_null()
    }

    pub fn value(&self) -> Option<&SqlValue> {
        match &self.payload {
            ParamPayload::Value(v) => Some(v),
            ParamPayload::Table(_) => None,
        }
    }

    pub fn table(&self) -> Option<&TableValue> {
        match &self.payload {
            ParamPayload::Table(t) => Some(t),
            ParamPayload::Value(_) => None,
        }
    }
}

/// Value the database returned for an out, in-out or return parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputValue {
    pub name: String,
    pub value: SqlValue,
}

impl OutputValue {
    pub fn new(name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
