use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use thiserror::Error;
use txload_core::MetricsBackend;
use txload_model::{Step, TimingSet};

/// Step latencies sit well below a second; the buckets start at 100µs.
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
    2.5,
];

#[derive(Debug, Error)]
pub enum PrometheusError {
    #[error("prometheus: {0}")]
    Prometheus(#[from] prometheus::Error),
}

#[derive(Clone)]
pub struct PrometheusMetrics {
    registry: Registry,
    transactions: IntCounter,
    failures: IntCounterVec,
    step_duration: HistogramVec,
    txn_duration: Histogram,
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, PrometheusError> {
        Self::with_registry(Registry::new())
    }

    /// Register all collectors in `registry`.
    ///
    /// Fails if a collector with the same name is already registered there.
    pub fn with_registry(registry: Registry) -> Result<Self, PrometheusError> {
        let transactions = IntCounter::with_opts(Opts::new(
            "txload_transactions_total",
            "Committed transactions",
        ))?;
        let failures = IntCounterVec::new(
            Opts::new(
                "txload_transaction_failures_total",
                "Failed transactions by step",
            ),
            &["step"],
        )?;
        let step_duration = HistogramVec::new(
            HistogramOpts::new(
                "txload_step_duration_seconds",
                "Latency of one transaction step",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
            &["step"],
        )?;
        let txn_duration = Histogram::with_opts(
            HistogramOpts::new(
                "txload_transaction_duration_seconds",
                "Sum of step latencies of a committed transaction",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
        )?;

        registry.register(Box::new(transactions.clone()))?;
        registry.register(Box::new(failures.clone()))?;
        registry.register(Box::new(step_duration.clone()))?;
        registry.register(Box::new(txn_duration.clone()))?;

        Ok(Self {
            registry,
            transactions,
            failures,
            step_duration,
            txn_duration,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition of everything gathered so far.
    pub fn encode(&self) -> Result<String, PrometheusError> {
        let families = self.registry.gather();
        Ok(TextEncoder::new().encode_to_string(&families)?)
    }
}

impl MetricsBackend for PrometheusMetrics {
    fn record_transaction(&self, timings: &TimingSet) {
        self.transactions.inc();
        for sample in timings.samples() {
            self.step_duration
                .with_label_values(&[sample.name.as_str()])
                .observe(sample.duration.as_secs_f64());
        }
        self.txn_duration.observe(timings.total().as_secs_f64());
    }

    fn record_failure(&self, step: Step) {
        self.failures.with_label_values(&[step.label()]).inc();
    }
}
