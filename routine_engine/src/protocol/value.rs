use crate::error::{Result, RoutineError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SqlTimestamp {
    pub year: i16,
    pub month: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub fraction: u32,
}

impl SqlTimestamp {
    pub fn date(year: i16, month: u16, day: u16) -> Self {
        Self {
            year,
            month,
            day,
            ..Self::default()
        }
    }
}

/// A single database value, used for parameters, row-set cells and result columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SqlValue {
    #[default]
    Null,
    Bool(bool),
    SmallInt(i16),
    Integer(i32),
    BigInt(i64),
    Real(f32),
    Double(f64),
    Decimal(String),
    String(String),
    Binary(Vec<u8>),
    Timestamp(SqlTimestamp),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "bool",
            SqlValue::SmallInt(_) => "smallint",
            SqlValue::Integer(_) => "integer",
            SqlValue::BigInt(_) => "bigint",
            SqlValue::Real(_) => "real",
            SqlValue::Double(_) => "double",
            SqlValue::Decimal(_) => "decimal",
            SqlValue::String(_) => "string",
            SqlValue::Binary(_) => "binary",
            SqlValue::Timestamp(_) => "timestamp",
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Bool(b) => Some(i64::from(*b)),
            SqlValue::SmallInt(n) => Some(i64::from(*n)),
            SqlValue::Integer(n) => Some(i64::from(*n)),
            SqlValue::BigInt(n) => Some(*n),
            SqlValue::Decimal(s) | SqlValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Real(n) => Some(f64::from(*n)),
            SqlValue::Double(n) => Some(*n),
            SqlValue::Decimal(s) | SqlValue::String(s) => s.trim().parse().ok(),
            other => other.as_i64().map(|n| n as f64),
        }
    }
}

fn conversion_error<T>(value: &SqlValue) -> RoutineError {
    RoutineError::Mapping(format!(
        "cannot convert {} value to {}",
        value.kind(),
        std::any::type_name::<T>()
    ))
}

/// Conversion from a database value into a host field type.
///
/// A database null becomes the type's zero value; wrap the field in
/// `Option` to keep nulls distinguishable.
pub trait FromSql: Sized {
    fn from_sql(value: SqlValue) -> Result<Self>;
}

impl FromSql for SqlValue {
    fn from_sql(value: SqlValue) -> Result<Self> {
        Ok(value)
    }
}

impl<T: FromSql> FromSql for Option<T> {
    fn from_sql(value: SqlValue) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::from_sql(value).map(Some)
    }
}

impl FromSql for bool {
    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Null => Ok(false),
            SqlValue::Bool(b) => Ok(b),
            ref other => other
                .as_i64()
                .map(|n| n != 0)
                .ok_or_else(|| conversion_error::<bool>(other)),
        }
    }
}

macro_rules! impl_from_sql_int {
    ($($t:ty),*) => {
        $(
            impl FromSql for $t {
                fn from_sql(value: SqlValue) -> Result<Self> {
                    if value.is_null() {
                        return Ok(0);
                    }
                    value
                        .as_i64()
                        .and_then(|n| <$t>::try_from(n).ok())
                        .ok_or_else(|| conversion_error::<$t>(&value))
                }
            }
        )*
    };
}

impl_from_sql_int!(i16, i32, i64, u8);

impl FromSql for f64 {
    fn from_sql(value: SqlValue) -> Result<Self> {
        if value.is_null() {
            return Ok(0.0);
        }
        value.as_f64().ok_or_else(|| conversion_error::<f64>(&value))
    }
}

impl FromSql for f32 {
    fn from_sql(value: SqlValue) -> Result<Self> {
        if value.is_null() {
            return Ok(0.0);
        }
        value
            .as_f64()
            .map(|n| n as f32)
            .ok_or_else(|| conversion_error::<f32>(&value))
    }
}

impl FromSql for String {
    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Null => Ok(String::new()),
            SqlValue::String(s) | SqlValue::Decimal(s) => Ok(s),
            SqlValue::Bool(b) => Ok(b.to_string()),
            SqlValue::SmallInt(n) => Ok(n.to_string()),
            SqlValue::Integer(n) => Ok(n.to_string()),
            SqlValue::BigInt(n) => Ok(n.to_string()),
            SqlValue::Real(n) => Ok(n.to_string()),
            SqlValue::Double(n) => Ok(n.to_string()),
            other => Err(conversion_error::<String>(&other)),
        }
    }
}

impl FromSql for Vec<u8> {
    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Null => Ok(Vec::new()),
            SqlValue::Binary(b) => Ok(b),
            SqlValue::String(s) => Ok(s.into_bytes()),
            other => Err(conversion_error::<Vec<u8>>(&other)),
        }
    }
}

impl FromSql for SqlTimestamp {
    fn from_sql(value: SqlValue) -> Result<Self> {
        match value {
            SqlValue::Null => Ok(SqlTimestamp::default()),
            SqlValue::Timestamp(t) => Ok(t),
            other => Err(conversion_error::<SqlTimestamp>(&other)),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i16> for SqlValue {
    fn from(v: i16) -> Self {
        SqlValue::SmallInt(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::BigInt(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Real(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Double(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Binary(v)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(v: &[u8]) -> Self {
        SqlValue::Binary(v.to_vec())
    }
}

impl From<SqlTimestamp> for SqlValue {
    fn from(v: SqlTimestamp) -> Self {
        SqlValue::Timestamp(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}
