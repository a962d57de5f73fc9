use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Latencies kept for the percentile summary; older calls fall off.
const LATENCY_WINDOW: usize = 1000;

/// Nearest-rank latency figures over the recent window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencySummary {
    pub samples: usize,
    pub mean: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
}

impl LatencySummary {
    fn from_window(window: &VecDeque<Duration>) -> Self {
        if window.is_empty() {
            return Self::default();
        }
        let mut sorted: Vec<Duration> = window.iter().copied().collect();
        sorted.sort_unstable();
        let rank = |pct: usize| sorted[((sorted.len() * pct + 99) / 100).max(1) - 1];
        let total: Duration = sorted.iter().sum();
        Self {
            samples: sorted.len(),
            mean: total / sorted.len() as u32,
            p50: rank(50),
            p95: rank(95),
            p99: rank(99),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallMetrics {
    pub call_count: u64,
    pub total_latency: Duration,
    pub min_latency: Duration,
    pub max_latency: Duration,
    pub rows_materialized: u64,
    pub result_sets: u64,
    recent: VecDeque<Duration>,
}

impl Default for CallMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl CallMetrics {
    pub fn new() -> Self {
        Self {
            call_count: 0,
            total_latency: Duration::ZERO,
            min_latency: Duration::MAX,
            max_latency: Duration::ZERO,
            rows_materialized: 0,
            result_sets: 0,
            recent: VecDeque::with_capacity(LATENCY_WINDOW),
        }
    }

    pub fn record_call(&mut self, latency: Duration, result_sets: usize, rows: usize) {
        self.call_count += 1;
        self.total_latency += latency;
        self.result_sets += result_sets as u64;
        self.rows_materialized += rows as u64;
        self.min_latency = self.min_latency.min(latency);
        self.max_latency = self.max_latency.max(latency);

        if self.recent.len() == LATENCY_WINDOW {
            self.recent.pop_front();
        }
        self.recent.push_back(latency);
    }

    pub fn latency(&self) -> LatencySummary {
        LatencySummary::from_window(&self.recent)
    }
}

/// Counters shared by every call a caller makes.
pub struct Metrics {
    call_metrics: Arc<Mutex<CallMetrics>>,
    procedure_calls: Arc<Mutex<HashMap<String, u64>>>,
    error_count: Arc<Mutex<u64>>,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            call_metrics: Arc::new(Mutex::new(CallMetrics::new())),
            procedure_calls: Arc::new(Mutex::new(HashMap::new())),
            error_count: Arc::new(Mutex::new(0)),
            start_time: Instant::now(),
        }
    }

    pub fn record_call(&self, procedure: &str, latency: Duration, result_sets: usize, rows: usize) {
        if let Ok(mut metrics) = self.call_metrics.lock() {
            metrics.record_call(latency, result_sets, rows);
        }
        if let Ok(mut calls) = self.procedure_calls.lock() {
            *calls.entry(procedure.to_string()).or_insert(0) += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut count) = self.error_count.lock() {
            *count += 1;
        }
    }

    pub fn get_call_metrics(&self) -> CallMetrics {
        self.call_metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|_| CallMetrics::new())
    }

    /// Successful calls of one procedure, by full name.
    pub fn get_procedure_calls(&self, procedure: &str) -> u64 {
        self.procedure_calls
            .lock()
            .ok()
            .and_then(|calls| calls.get(procedure).copied())
            .unwrap_or(0)
    }

    pub fn get_error_count(&self) -> u64 {
        self.error_count.lock().map(|c| *c).unwrap_or(0)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_metrics_new() {
        let metrics = CallMetrics::new();
        assert_eq!(metrics.call_count, 0);
        assert_eq!(metrics.min_latency, Duration::MAX);
        assert_eq!(metrics.rows_materialized, 0);
        assert_eq!(metrics.latency(), LatencySummary::default());
    }

    #[test]
    fn test_call_metrics_record() {
        let mut metrics = CallMetrics::new();
        metrics.record_call(Duration::from_millis(50), 2, 10);
        metrics.record_call(Duration::from_millis(150), 1, 3);

        assert_eq!(metrics.call_count, 2);
        assert_eq!(metrics.result_sets, 3);
        assert_eq!(metrics.rows_materialized, 13);
        assert_eq!(metrics.min_latency, Duration::from_millis(50));
        assert_eq!(metrics.max_latency, Duration::from_millis(150));
        assert_eq!(metrics.latency().mean, Duration::from_millis(100));
    }

    #[test]
    fn test_latency_summary_nearest_rank() {
        let mut metrics = CallMetrics::new();
        for ms in (1..=100).rev() {
            metrics.record_call(Duration::from_millis(ms), 0, 0);
        }
        let summary = metrics.latency();
        assert_eq!(summary.samples, 100);
        assert_eq!(summary.p50, Duration::from_millis(50));
        assert_eq!(summary.p95, Duration::from_millis(95));
        assert_eq!(summary.p99, Duration::from_millis(99));

        let mut single = CallMetrics::new();
        single.record_call(Duration::from_millis(7), 0, 0);
        assert_eq!(single.latency().p50, Duration::from_millis(7));
        assert_eq!(single.latency().p99, Duration::from_millis(7));
    }

    #[test]
    fn test_latency_window_drops_oldest() {
        let mut metrics = CallMetrics::new();
        for _ in 0..LATENCY_WINDOW {
            metrics.record_call(Duration::from_secs(10), 0, 0);
        }
        for _ in 0..LATENCY_WINDOW {
            metrics.record_call(Duration::from_millis(1), 0, 0);
        }
        let summary = metrics.latency();
        assert_eq!(summary.samples, LATENCY_WINDOW);
        assert_eq!(summary.p99, Duration::from_millis(1));
        assert_eq!(metrics.call_count, 2 * LATENCY_WINDOW as u64);
        assert_eq!(metrics.max_latency, Duration::from_secs(10));
    }

    #[test]
    fn test_metrics_per_procedure_and_errors() {
        let metrics = Metrics::default();
        metrics.record_call("dbo.A", Duration::from_millis(1), 1, 4);
        metrics.record_call("dbo.A", Duration::from_millis(1), 1, 4);
        metrics.record_call("dbo.B", Duration::from_millis(1), 0, 0);
        metrics.record_error();

        assert_eq!(metrics.get_procedure_calls("dbo.A"), 2);
        assert_eq!(metrics.get_procedure_calls("dbo.C"), 0);
        assert_eq!(metrics.get_call_metrics().rows_materialized, 8);
        assert_eq!(metrics.get_error_count(), 1);
    }

    #[test]
    fn test_metrics_uptime() {
        let metrics = Metrics::new();
        std::thread::sleep(Duration::from_millis(5));
        assert!(metrics.uptime() >= Duration::from_millis(5));
    }
}
