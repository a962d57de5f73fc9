use crate::error::Result;
use crate::protocol::{DbType, OutputValue, ParameterValue, SqlValue};
use std::io::Write;
use std::time::Duration;

/// Opaque id of a transaction owned by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionHandle(pub u32);

/// Metadata of one column of the current result set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    pub db_type: Option<DbType>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_type: None,
        }
    }

    pub fn typed(name: impl Into<String>, db_type: DbType) -> Self {
        Self {
            name: name.into(),
            db_type: Some(db_type),
        }
    }
}

/// Everything the executor needs to run one routine.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineRequest {
    /// Schema-qualified routine name
    pub procedure: String,
    pub parameters: Vec<ParameterValue>,
    pub timeout: Option<Duration>,
    pub transaction: Option<TransactionHandle>,
}

/// Forward-only reader over the result sets of one execution.
///
/// The cursor starts before the first result set; `next_result` must return
/// true before rows of a set can be read.
pub trait ResultCursor {
    fn columns(&self) -> Result<Vec<ColumnInfo>>;

    fn next_row(&mut self) -> Result<bool>;

    fn get_value(&mut self, column: usize) -> Result<SqlValue>;

    /// Copies a large column of the current row into `sink`.
    fn copy_stream(&mut self, column: usize, sink: &mut dyn Write) -> Result<u64>;

    fn next_result(&mut self) -> Result<bool>;

    /// Output and return values. Only complete once all result sets the
    /// caller wants have been read.
    fn output_values(&mut self) -> Result<Vec<OutputValue>>;
}

/// Connection-level seam between the engine and a database driver.
pub trait RoutineExecutor {
    fn is_open(&self) -> bool;

    fn open(&mut self) -> Result<()>;

    fn close(&mut self) -> Result<()>;

    fn execute(&mut self, request: &RoutineRequest) -> Result<Box<dyn ResultCursor + '_>>;
}
