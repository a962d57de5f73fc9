//! Routine models shared by the integration tests.
#![allow(dead_code)]

pub mod models;

#[allow(unused_imports)]
pub use models::{
    AuditEntry, Customer, Document, Order, OrderLine, SaveOrderParams, StatusParams,
};

use routine_engine::RoutineRequest;

/// Initializes env_logger once; safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Parameter of `request` with the given name, case-insensitive.
pub fn param<'a>(
    request: &'a RoutineRequest,
    name: &str,
) -> Option<&'a routine_engine::ParameterValue> {
    request
        .parameters
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
}
