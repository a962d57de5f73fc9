pub mod async_bridge;
pub mod binding;
pub mod config;
pub mod engine;
mod error;
pub mod materialize;
pub mod metadata;
pub mod observability;
pub mod protocol;
pub mod results;

pub use config::EngineOptions;
pub use engine::{
    AsyncCall, CancellationToken, ColumnInfo, ProcedureDescriptor, ResultCursor, RoutineCaller,
    RoutineExecutor, RoutineRequest, TransactionHandle,
};
pub use error::{ErrorCategory, Result, RoutineError};
pub use materialize::SinkStream;
pub use metadata::{
    unknown_field, Describe, FieldDecl, FieldInput, FieldValue, NoParams, Record, StreamSpec,
    StreamTarget, TextEncoding, TypeDecl,
};
pub use protocol::{
    DbType, Direction, FromSql, OutputValue, ParameterValue, SqlTimestamp, SqlValue, TableValue,
};
pub use results::{ResultSet, ResultType, ResultsCollection};
