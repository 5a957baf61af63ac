use rand::rngs::SmallRng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use txload_model::{Budget, TimingSet};

use crate::error::RunError;
use crate::exec::Executor;
use crate::metrics::MetricsHandle;
use crate::payload::work_item;
use crate::store::Store;

pub(crate) struct Worker<S> {
    pub id: usize,
    pub budget: Budget,
    pub executor: Executor<S>,
    pub rng: SmallRng,
    pub tx: mpsc::Sender<TimingSet>,
    pub token: CancellationToken,
    pub metrics: MetricsHandle,
    pub key_len: usize,
    pub size: usize,
}

impl<S: Store> Worker<S> {
    /// Loop transactions until the budget is spent or the token is cancelled.
    ///
    /// Cancellation is checked between iterations only; a started transaction always finishes.
    /// Returns the number of committed transactions.
    pub async fn run(mut self) -> Result<u64, RunError> {
        debug!(worker = self.id, budget = %self.budget, "worker started");
        let mut done = 0u64;

        while self.budget.allows(done) && !self.token.is_cancelled() {
            let item = work_item(&mut self.rng, self.key_len, self.size);
            let completed = match self.executor.run(&item).await {
                Ok(c) => c,
                Err(source) => {
                    self.metrics.record_failure(source.step);
                    return Err(RunError::Transaction {
                        worker: self.id,
                        source,
                    });
                }
            };
            done += 1;
            self.metrics.record_transaction(&completed.timings);

            // Blocks only when the buffer is full; the timings above are already measured.
            if self.tx.send(completed.timings).await.is_err() {
                trace!(worker = self.id, "aggregator gone; sample dropped");
            }
        }

        debug!(worker = self.id, done, "worker finished");
        Ok(done)
    }
}
