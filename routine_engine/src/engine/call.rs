use crate::async_bridge::run_blocking;
use crate::binding::{bind, replay_outputs, BoundParameters};
use crate::config::EngineOptions;
use crate::engine::cancellation::CancellationToken;
use crate::engine::descriptor::ProcedureDescriptor;
use crate::engine::executor::{RoutineExecutor, RoutineRequest};
use crate::error::{Result, RoutineError};
use crate::metadata::{bindings_for, Describe, NoParams, Record};
use crate::observability::{LatencySummary, Metrics, StructuredLogger};
use crate::protocol::OutputValue;
use crate::results::{ResultType, ResultsCollection};
use log::Level;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// What an async call hands back: the results plus the moved-in parameter
/// object (with outputs replayed) and executor.
#[derive(Debug)]
pub struct AsyncCall<E, P> {
    pub results: ResultsCollection,
    pub params: Option<P>,
    pub executor: E,
}

/// Runs stored routines through a [`RoutineExecutor`]: binds parameters,
/// materializes the declared result sets and replays output parameters.
#[derive(Clone)]
pub struct RoutineCaller {
    options: EngineOptions,
    logger: Arc<StructuredLogger>,
    metrics: Arc<Metrics>,
}

impl RoutineCaller {
    pub fn new(options: EngineOptions) -> Self {
        let logger = Arc::new(StructuredLogger::new(options.logging_enabled));
        Self {
            options,
            logger,
            metrics: Arc::new(Metrics::new()),
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn get_metrics(&self) -> Arc<Metrics> {
        Arc::clone(&self.metrics)
    }

    /// Writes the counters and recent latency percentiles through the
    /// structured logger and returns the latency figures.
    pub fn log_metrics(&self) -> LatencySummary {
        let calls = self.metrics.get_call_metrics();
        let latency = calls.latency();
        let ms = |d: Duration| d.as_secs_f64() * 1000.0;

        self.logger.log_metric("calls", calls.call_count as f64, "");
        self.logger
            .log_metric("errors", self.metrics.get_error_count() as f64, "");
        self.logger
            .log_metric("rows_materialized", calls.rows_materialized as f64, "");
        self.logger.log_metric("latency_mean", ms(latency.mean), "ms");
        self.logger.log_metric("latency_p50", ms(latency.p50), "ms");
        self.logger.log_metric("latency_p95", ms(latency.p95), "ms");
        self.logger.log_metric("latency_p99", ms(latency.p99), "ms");
        latency
    }

    pub fn call<E, P>(
        &self,
        executor: &mut E,
        descriptor: &ProcedureDescriptor,
        params: Option<&mut P>,
    ) -> Result<ResultsCollection>
    where
        E: RoutineExecutor + ?Sized,
        P: Describe + Record + 'static,
    {
        self.call_with_cancel(executor, descriptor, params, &CancellationToken::new())
    }

    pub fn call_with_cancel<E, P>(
        &self,
        executor: &mut E,
        descriptor: &ProcedureDescriptor,
        params: Option<&mut P>,
        cancel: &CancellationToken,
    ) -> Result<ResultsCollection>
    where
        E: RoutineExecutor + ?Sized,
        P: Describe + Record + 'static,
    {
        self.run(executor, descriptor, descriptor.result_types(), params, cancel)
    }

    /// Calls a routine that takes no parameters.
    pub fn call_without_params<E>(
        &self,
        executor: &mut E,
        descriptor: &ProcedureDescriptor,
    ) -> Result<ResultsCollection>
    where
        E: RoutineExecutor + ?Sized,
    {
        self.call::<E, NoParams>(executor, descriptor, None)
    }

    /// Runs the routine without reading any result set; outputs are still
    /// replayed.
    pub fn call_non_query<E, P>(
        &self,
        executor: &mut E,
        descriptor: &ProcedureDescriptor,
        params: Option<&mut P>,
    ) -> Result<()>
    where
        E: RoutineExecutor + ?Sized,
        P: Describe + Record + 'static,
    {
        self.run(executor, descriptor, &[], params, &CancellationToken::new())
            .map(|_| ())
    }

    /// Reads the first result set as `T`, ignoring the descriptor's declared
    /// result types.
    pub fn call_single<T, E, P>(
        &self,
        executor: &mut E,
        descriptor: &ProcedureDescriptor,
        params: Option<&mut P>,
    ) -> Result<Vec<T>>
    where
        T: Describe + Record + Default + Send + 'static,
        E: RoutineExecutor + ?Sized,
        P: Describe + Record + 'static,
    {
        let types = [ResultType::of::<T>()];
        let mut results = self.run(executor, descriptor, &types, params, &CancellationToken::new())?;
        Ok(results.take::<T>())
    }

    /// Runs the whole call on tokio's blocking pool.
    pub fn call_async<E, P>(
        &self,
        mut executor: E,
        descriptor: ProcedureDescriptor,
        mut params: Option<P>,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<AsyncCall<E, P>>> + Send + 'static
    where
        E: RoutineExecutor + Send + 'static,
        P: Describe + Record + Send + 'static,
    {
        let caller = self.clone();
        run_blocking(move || {
            let results =
                caller.call_with_cancel(&mut executor, &descriptor, params.as_mut(), &cancel)?;
            Ok(AsyncCall {
                results,
                params,
                executor,
            })
        })
    }

    fn run<E, P>(
        &self,
        executor: &mut E,
        descriptor: &ProcedureDescriptor,
        result_types: &[ResultType],
        params: Option<&mut P>,
        cancel: &CancellationToken,
    ) -> Result<ResultsCollection>
    where
        E: RoutineExecutor + ?Sized,
        P: Describe + Record + 'static,
    {
        if !descriptor.has_name() {
            return Err(RoutineError::MissingProcedureName);
        }
        let procedure = descriptor.qualified_name(&self.options.default_schema);
        let started = Instant::now();

        self.logger.log_call(
            Level::Debug,
            &procedure,
            &[
                ("event", "start".to_string()),
                ("result_types", result_types.len().to_string()),
            ],
        );

        let mut dispatched = false;
        let outcome = self.execute(
            executor,
            descriptor,
            result_types,
            params,
            cancel,
            &mut dispatched,
        );
        match outcome {
            Ok(results) => {
                let elapsed = started.elapsed();
                let rows: usize = results.iter().map(|s| s.len()).sum();
                self.metrics
                    .record_call(&procedure, elapsed, results.len(), rows);
                self.logger.log_call(
                    Level::Info,
                    &procedure,
                    &[
                        ("event", "finish".to_string()),
                        ("sets", results.len().to_string()),
                        ("rows", rows.to_string()),
                        ("duration_ms", elapsed.as_millis().to_string()),
                    ],
                );
                Ok(results)
            }
            Err(err) => {
                self.metrics.record_error();
                self.logger.log_error(
                    &procedure,
                    &err.to_string(),
                    &[("category", format!("{:?}", err.error_category()))],
                );
                // Declaration errors stay bare only while nothing reached the executor
                let bare = matches!(err, RoutineError::Cancelled)
                    || (!dispatched && err.is_declaration_error());
                if bare {
                    return Err(err);
                }
                Err(RoutineError::Call {
                    procedure,
                    source: Box::new(err),
                })
            }
        }
    }

    fn execute<E, P>(
        &self,
        executor: &mut E,
        descriptor: &ProcedureDescriptor,
        result_types: &[ResultType],
        params: Option<&mut P>,
        cancel: &CancellationToken,
        dispatched: &mut bool,
    ) -> Result<ResultsCollection>
    where
        E: RoutineExecutor + ?Sized,
        P: Describe + Record + 'static,
    {
        let bindings = bindings_for::<P>()?;
        let host: Option<&dyn Record> = params.as_deref().map(|p| p as &dyn Record);
        let BoundParameters {
            parameters,
            field_map,
        } = bind(host, &bindings)?;

        cancel.check()?;
        *dispatched = true;
        let procedure = descriptor.qualified_name(&self.options.default_schema);

        let owned = !executor.is_open();
        if owned {
            executor.open()?;
            self.logger.log_connection(Level::Debug, &procedure, "open");
        }

        let request = RoutineRequest {
            procedure: procedure.clone(),
            parameters,
            timeout: descriptor
                .timeout_override()
                .or_else(|| self.options.default_timeout()),
            transaction: descriptor.transaction_handle(),
        };
        let outcome = self.read_results(executor, &request, result_types, cancel);

        if owned {
            let closed = executor.close();
            self.logger.log_connection(Level::Debug, &procedure, "close");
            if let Err(close_err) = closed {
                if outcome.is_ok() {
                    return Err(close_err);
                }
                log::warn!("closing connection for {} failed: {}", procedure, close_err);
            }
        }

        let (results, outputs) = outcome?;

        cancel.check()?;
        if let Some(host) = params {
            let written = replay_outputs(host, &field_map, outputs)?;
            log::trace!("replayed {} output values for {}", written, procedure);
        }
        Ok(results)
    }

    fn read_results<E>(
        &self,
        executor: &mut E,
        request: &RoutineRequest,
        result_types: &[ResultType],
        cancel: &CancellationToken,
    ) -> Result<(ResultsCollection, Vec<OutputValue>)>
    where
        E: RoutineExecutor + ?Sized,
    {
        cancel.check()?;
        let mut cursor = executor.execute(request)?;
        let sink = self.options.sink_options();

        let mut results = ResultsCollection::new();
        for result_type in result_types {
            cancel.check()?;
            if !cursor.next_result()? {
                log::debug!(
                    "{} returned {} of {} declared result sets",
                    request.procedure,
                    results.len(),
                    result_types.len()
                );
                break;
            }
            results.push(result_type.materialize(cursor.as_mut(), &sink, cancel)?);
        }

        let outputs = cursor.output_values()?;
        Ok((results, outputs))
    }
}

impl Default for RoutineCaller {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}
