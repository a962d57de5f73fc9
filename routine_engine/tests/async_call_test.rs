mod helpers;

use helpers::{Customer, SaveOrderParams};
use routine_engine::async_bridge::{execute_async, init_runtime};
use routine_engine::engine::scripted::{ScriptedExecutor, ScriptedResultSet};
use routine_engine::{
    CancellationToken, OutputValue, ProcedureDescriptor, RoutineCaller, RoutineError,
};
use serial_test::serial;

#[test]
#[serial]
fn test_call_async_returns_results_params_and_executor() {
    init_runtime().unwrap();
    let caller = RoutineCaller::default();
    let executor = ScriptedExecutor::new()
        .with_result_set(
            ScriptedResultSet::new(&["CustomerId", "name"]).row(vec![5.into(), "Lin".into()]),
        )
        .with_outputs(vec![OutputValue::new("OrderId", 77i64)]);
    let descriptor = ProcedureDescriptor::new("SaveAndList").returns::<Customer>();
    let params = SaveOrderParams {
        customer_id: 5,
        ..Default::default()
    };

    let call = execute_async(caller.call_async(
        executor,
        descriptor,
        Some(params),
        CancellationToken::new(),
    ))
    .unwrap();

    let customers = call.results.by_type::<Customer>();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].id, 5);
    assert_eq!(call.params.unwrap().order_id, 77);
    assert_eq!(call.executor.open_count(), 1);
    assert_eq!(call.executor.close_count(), 1);
}

#[test]
#[serial]
fn test_call_async_observes_cancellation() {
    let caller = RoutineCaller::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = execute_async(caller.call_async::<_, SaveOrderParams>(
        ScriptedExecutor::new(),
        ProcedureDescriptor::new("SaveAndList"),
        None,
        cancel,
    ));

    assert!(matches!(result, Err(RoutineError::Cancelled)));
}

#[test]
#[serial]
fn test_concurrent_async_calls() {
    let caller = RoutineCaller::default();
    let calls = (0..4).map(|i| {
        let executor = ScriptedExecutor::new().with_result_set(
            ScriptedResultSet::new(&["CustomerId", "name"]).row(vec![i.into(), "x".into()]),
        );
        caller.call_async::<_, SaveOrderParams>(
            executor,
            ProcedureDescriptor::new("GetCustomers").returns::<Customer>(),
            None,
            CancellationToken::new(),
        )
    });
    let pending: Vec<_> = calls.collect();

    let ids = execute_async(async move {
        let mut ids = Vec::new();
        for call in pending {
            let call = call.await?;
            ids.push(call.results.by_type::<Customer>()[0].id);
        }
        Ok(ids)
    })
    .unwrap();

    assert_eq!(ids, vec![0, 1, 2, 3]);
    assert_eq!(caller.get_metrics().get_call_metrics().call_count, 4);
}
