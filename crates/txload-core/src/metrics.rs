use std::sync::Arc;

use txload_model::{Step, TimingSet};

/// Sink for per-transaction measurements, fed by the workers.
pub trait MetricsBackend: Send + Sync {
    fn record_transaction(&self, timings: &TimingSet);
    fn record_failure(&self, step: Step);
}

pub type MetricsHandle = Arc<dyn MetricsBackend>;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsBackend for NoopMetrics {
    #[inline]
    fn record_transaction(&self, _timings: &TimingSet) {}
    #[inline]
    fn record_failure(&self, _step: Step) {}
}

impl NoopMetrics {
    pub fn handle() -> MetricsHandle {
        Arc::new(NoopMetrics)
    }
}
