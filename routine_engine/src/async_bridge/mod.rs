use crate::error::{Result, RoutineError};
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tokio::runtime::Runtime;

static RUNTIME: OnceLock<std::result::Result<Arc<Runtime>, String>> = OnceLock::new();

fn get_runtime() -> Result<Arc<Runtime>> {
    let runtime = RUNTIME.get_or_init(|| {
        Runtime::new()
            .map(Arc::new)
            .map_err(|e| format!("Failed to create tokio runtime: {}", e))
    });

    match runtime {
        Ok(rt) => Ok(Arc::clone(rt)),
        Err(msg) => Err(RoutineError::InternalError(msg.clone())),
    }
}

/// Creates the process-wide runtime ahead of the first async call.
pub fn init_runtime() -> Result<()> {
    get_runtime().map(|_| ())
}

/// Drives `f` to completion on the process-wide runtime, for sync callers.
///
/// Must not be called from inside another tokio runtime.
pub fn execute_async<F, R>(f: F) -> Result<R>
where
    F: Future<Output = Result<R>> + Send + 'static,
    R: Send + 'static,
{
    let runtime = get_runtime()?;
    runtime.block_on(f)
}

/// Runs blocking routine work on tokio's blocking pool.
pub async fn run_blocking<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send + 'static,
    R: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| RoutineError::InternalError(format!("blocking call failed: {}", e)))?
}
