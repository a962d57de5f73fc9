use serde::{Deserialize, Serialize};

/// Database-side type of a parameter or row-set column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DbType {
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Real,
    Float,
    Decimal,
    Numeric,
    Money,
    Char,
    VarChar,
    NChar,
    NVarChar,
    Text,
    NText,
    Binary,
    VarBinary,
    Image,
    Date,
    Time,
    DateTime,
    DateTime2,
    UniqueIdentifier,
    Xml,
    /// User-defined scalar type; the name travels in `type_name`
    Udt,
    /// Table-valued (row-set) parameter
    Structured,
}

impl DbType {
    /// Character and binary families that carry an explicit size.
    pub fn is_variable_length(&self) -> bool {
        matches!(
            self,
            DbType::Char
                | DbType::VarChar
                | DbType::NChar
                | DbType::NVarChar
                | DbType::Binary
                | DbType::VarBinary
        )
    }

    pub fn is_decimal(&self) -> bool {
        matches!(self, DbType::Decimal | DbType::Numeric)
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, DbType::Structured)
    }

    pub fn sql_name(&self) -> &'static str {
        match self {
            DbType::Bit => "bit",
            DbType::TinyInt => "tinyint",
            DbType::SmallInt => "smallint",
            DbType::Int => "int",
            DbType::BigInt => "bigint",
            DbType::Real => "real",
            DbType::Float => "float",
            DbType::Decimal => "decimal",
            DbType::Numeric => "numeric",
            DbType::Money => "money",
            DbType::Char => "char",
            DbType::VarChar => "varchar",
            DbType::NChar => "nchar",
            DbType::NVarChar => "nvarchar",
            DbType::Text => "text",
            DbType::NText => "ntext",
            DbType::Binary => "binary",
            DbType::VarBinary => "varbinary",
            DbType::Image => "image",
            DbType::Date => "date",
            DbType::Time => "time",
            DbType::DateTime => "datetime",
            DbType::DateTime2 => "datetime2",
            DbType::UniqueIdentifier => "uniqueidentifier",
            DbType::Xml => "xml",
            DbType::Udt => "udt",
            DbType::Structured => "structured",
        }
    }
}

/// Parameter direction as declared on the host field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Input,
    Output,
    InputOutput,
    ReturnValue,
}

impl Direction {
    /// True when the database sends a value back for this parameter.
    pub fn is_output(&self) -> bool {
        !matches!(self, Direction::Input)
    }

    /// True when the host value is sent to the database.
    pub fn is_input(&self) -> bool {
        matches!(self, Direction::Input | Direction::InputOutput)
    }
}
