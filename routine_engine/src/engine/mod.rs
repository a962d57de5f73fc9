pub mod call;
pub mod cancellation;
pub mod descriptor;
pub mod executor;
#[cfg(any(test, feature = "test-helpers"))]
pub mod scripted;

pub use call::{AsyncCall, RoutineCaller};
pub use cancellation::CancellationToken;
pub use descriptor::ProcedureDescriptor;
pub use executor::{ColumnInfo, ResultCursor, RoutineExecutor, RoutineRequest, TransactionHandle};
