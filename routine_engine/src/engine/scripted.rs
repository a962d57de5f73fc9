//! In-memory executor that replays scripted result sets.
//!
//! Used by the crate's own tests and by downstream crates that want to
//! exercise their routine models without a database.

use crate::engine::cancellation::CancellationToken;
use crate::engine::executor::{ColumnInfo, ResultCursor, RoutineExecutor, RoutineRequest};
use crate::error::{Result, RoutineError};
use crate::protocol::{OutputValue, SqlValue};
use std::io::Write;

/// One scripted result set. Rows shorter than the column list report the
/// missing cells as not found.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResultSet {
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<SqlValue>>,
    failing_column: Option<(usize, RoutineError)>,
}

impl ScriptedResultSet {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| ColumnInfo::new(*c)).collect(),
            ..Self::default()
        }
    }

    pub fn with_columns(columns: Vec<ColumnInfo>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn row(mut self, values: Vec<SqlValue>) -> Self {
        self.rows.push(values);
        self
    }

    /// Every read of `column` fails with `error`.
    pub fn fail_column(mut self, column: usize, error: RoutineError) -> Self {
        self.failing_column = Some((column, error));
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    open: bool,
    sets: Vec<ScriptedResultSet>,
    outputs: Vec<OutputValue>,
    execute_error: Option<RoutineError>,
    cancel_after: Option<(usize, CancellationToken)>,
    requests: Vec<RoutineRequest>,
    open_count: usize,
    close_count: usize,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_result_set(mut self, set: ScriptedResultSet) -> Self {
        self.sets.push(set);
        self
    }

    pub fn with_outputs(mut self, outputs: Vec<OutputValue>) -> Self {
        self.outputs = outputs;
        self
    }

    /// `execute` fails with `error`.
    pub fn failing_with(mut self, error: RoutineError) -> Self {
        self.execute_error = Some(error);
        self
    }

    /// Starts with the connection already open, as a caller-owned one would be.
    pub fn opened(mut self) -> Self {
        self.open = true;
        self
    }

    /// Cancels `token` once `rows` rows have been fetched.
    pub fn cancel_after_rows(mut self, rows: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((rows, token));
        self
    }

    pub fn requests(&self) -> &[RoutineRequest] {
        &self.requests
    }

    pub fn last_request(&self) -> Option<&RoutineRequest> {
        self.requests.last()
    }

    pub fn open_count(&self) -> usize {
        self.open_count
    }

    pub fn close_count(&self) -> usize {
        self.close_count
    }
}

impl RoutineExecutor for ScriptedExecutor {
    fn is_open(&self) -> bool {
        self.open
    }

    fn open(&mut self) -> Result<()> {
        self.open = true;
        self.open_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.open = false;
        self.close_count += 1;
        Ok(())
    }

    fn execute(&mut self, request: &RoutineRequest) -> Result<Box<dyn ResultCursor + '_>> {
        if !self.open {
            return Err(RoutineError::Driver("connection is not open".to_string()));
        }
        self.requests.push(request.clone());
        if let Some(err) = &self.execute_error {
            return Err(err.clone());
        }
        Ok(Box::new(ScriptedCursor {
            sets: &self.sets,
            outputs: &self.outputs,
            set: None,
            row: None,
            fetched: 0,
            cancel_after: self.cancel_after.clone(),
        }))
    }
}

struct ScriptedCursor<'a> {
    sets: &'a [ScriptedResultSet],
    outputs: &'a [OutputValue],
    set: Option<usize>,
    row: Option<usize>,
    fetched: usize,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl ScriptedCursor<'_> {
    fn current_set(&self) -> Result<&ScriptedResultSet> {
        self.set
            .and_then(|i| self.sets.get(i))
            .ok_or_else(|| RoutineError::Driver("no current result set".to_string()))
    }

    fn cell(&self, column: usize) -> Result<&SqlValue> {
        let set = self.current_set()?;
        if let Some((failing, err)) = &set.failing_column {
            if *failing == column {
                return Err(err.clone());
            }
        }
        let row = self
            .row
            .and_then(|r| set.rows.get(r))
            .ok_or_else(|| RoutineError::Driver("no current row".to_string()))?;
        row.get(column).ok_or_else(|| {
            let name = set
                .columns
                .get(column)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| format!("#{}", column));
            RoutineError::ColumnNotFound(name)
        })
    }
}

impl ResultCursor for ScriptedCursor<'_> {
    fn columns(&self) -> Result<Vec<ColumnInfo>> {
        Ok(self.current_set()?.columns.clone())
    }

    fn next_row(&mut self) -> Result<bool> {
        let total = self.current_set()?.rows.len();
        let next = self.row.map_or(0, |r| r + 1);
        self.row = Some(next);
        if next >= total {
            return Ok(false);
        }
        self.fetched += 1;
        if let Some((after, token)) = &self.cancel_after {
            if self.fetched >= *after {
                token.cancel();
            }
        }
        Ok(true)
    }

    fn get_value(&mut self, column: usize) -> Result<SqlValue> {
        self.cell(column).cloned()
    }

    fn copy_stream(&mut self, column: usize, sink: &mut dyn Write) -> Result<u64> {
        let bytes: &[u8] = match self.cell(column)? {
            SqlValue::Binary(b) => b,
            SqlValue::String(s) => s.as_bytes(),
            SqlValue::Null => &[],
            other => {
                return Err(RoutineError::Driver(format!(
                    "column {} holds a {} value, not a stream",
                    column,
                    other.kind()
                )))
            }
        };
        sink.write_all(bytes)?;
        Ok(bytes.len() as u64)
    }

    fn next_result(&mut self) -> Result<bool> {
        let next = self.set.map_or(0, |s| s + 1);
        self.set = Some(next);
        self.row = None;
        Ok(next < self.sets.len())
    }

    fn output_values(&mut self) -> Result<Vec<OutputValue>> {
        Ok(self.outputs.to_vec())
    }
}
