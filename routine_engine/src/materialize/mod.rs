pub mod matcher;
pub mod reader;
pub mod sink;

pub use matcher::{match_columns, ColumnMatch, ReadPlan};
pub use reader::{materialize_set, read_row};
pub use sink::{deliver, SinkOptions, SinkStream, DEFAULT_COPY_BUFFER};
