use crate::engine::executor::TransactionHandle;
use crate::metadata::{Describe, Record, DEFAULT_SCHEMA};
use crate::results::ResultType;
use std::time::Duration;

/// Identity and call settings of one stored routine.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureDescriptor {
    schema: Option<String>,
    name: String,
    returns: Vec<ResultType>,
    timeout: Option<Duration>,
    transaction: Option<TransactionHandle>,
}

impl ProcedureDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            returns: Vec::new(),
            timeout: None,
            transaction: None,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Declares the element type of the next expected result set.
    pub fn returns<T>(mut self) -> Self
    where
        T: Describe + Record + Default + Send + 'static,
    {
        self.returns.push(ResultType::of::<T>());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn transaction(mut self, handle: TransactionHandle) -> Self {
        self.transaction = Some(handle);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_name(&self) -> &str {
        self.schema.as_deref().unwrap_or(DEFAULT_SCHEMA)
    }

    /// `schema.name`, with the schema defaulting to `dbo`.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.schema_name(), self.name)
    }

    /// Like [`full_name`](Self::full_name) but with a caller-supplied
    /// default schema.
    pub fn qualified_name(&self, default_schema: &str) -> String {
        format!(
            "{}.{}",
            self.schema.as_deref().unwrap_or(default_schema),
            self.name
        )
    }

    pub fn result_types(&self) -> &[ResultType] {
        &self.returns
    }

    pub fn timeout_override(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn transaction_handle(&self) -> Option<TransactionHandle> {
        self.transaction
    }

    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}
