//! Worker fan-out and run lifecycle.
mod plan;
pub use plan::split_budgets;

mod worker;
use worker::Worker;

use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use txload_model::{TimingSet, duration_us};

use crate::config::RunConfig;
use crate::error::RunError;
use crate::exec::Executor;
use crate::metrics::{MetricsHandle, NoopMetrics};
use crate::progress::{AggregateStats, Aggregator};
use crate::seed::SeedSource;
use crate::store::Store;

/// Outcome of a finished (or drained) run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Workers that were actually spawned.
    pub workers: usize,
    /// Transactions seen by the aggregator.
    pub transactions: u64,
    #[serde(rename = "totalUs", with = "duration_us")]
    pub total: Duration,
    #[serde(rename = "averageUs", with = "duration_us")]
    pub average: Duration,
    #[serde(rename = "elapsedUs", with = "duration_us")]
    pub elapsed: Duration,
    pub rate: u64,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<TimingSet>,
}

impl RunSummary {
    fn new(workers: usize, stats: &AggregateStats, cancelled: bool) -> Self {
        let now = Instant::now();
        Self {
            workers,
            transactions: stats.count(),
            total: stats.total(),
            average: stats.average(),
            elapsed: now.saturating_duration_since(stats.started()),
            rate: stats.rate(now),
            cancelled,
            last: stats.last().cloned(),
        }
    }
}

/// Runs the configured workload against one store.
pub struct BatchRunner<S: Store> {
    store: Arc<S>,
    cfg: RunConfig,
    seeds: Arc<SeedSource>,
    metrics: MetricsHandle,
    output: Box<dyn Write + Send>,
}

impl<S: Store> BatchRunner<S> {
    pub fn new(store: Arc<S>, cfg: RunConfig, seeds: SeedSource) -> Self {
        Self {
            store,
            cfg,
            seeds: Arc::new(seeds),
            metrics: NoopMetrics::handle(),
            output: Box::new(std::io::stdout()),
        }
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    /// Where the status line is drawn (stdout by default).
    pub fn with_output(mut self, out: impl Write + Send + 'static) -> Self {
        self.output = Box::new(out);
        self
    }

    /// Run until every worker is done or `token` is cancelled.
    ///
    /// The first transaction error stops the whole run: remaining workers are aborted without
    /// draining and the error is returned.
    pub async fn run(self, token: CancellationToken) -> Result<RunSummary, RunError> {
        self.cfg.validate()?;
        let budgets = split_budgets(self.cfg.count, self.cfg.threads);

        let (tx, rx) = mpsc::channel(self.cfg.buffer);
        let agg_token = token.child_token();
        let aggregator = tokio::spawn(Aggregator::new(rx, agg_token.clone(), self.output).run());

        let executor = Executor::new(Arc::clone(&self.store));
        let mut workers = JoinSet::new();
        for (id, budget) in budgets.into_iter().enumerate() {
            if budget.is_empty() {
                debug!(worker = id, "no transactions assigned; not spawning");
                continue;
            }
            let worker = Worker {
                id,
                budget,
                executor: executor.clone(),
                rng: self.seeds.rng(),
                tx: tx.clone(),
                token: token.clone(),
                metrics: Arc::clone(&self.metrics),
                key_len: self.cfg.key_len,
                size: self.cfg.size,
            };
            workers.spawn(worker.run());
        }
        drop(tx);

        let spawned = workers.len();
        info!(
            store = self.store.name(),
            workers = spawned,
            count = self.cfg.count,
            size = self.cfg.size,
            "workload started"
        );

        let mut failure = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => {
                    failure = Some(e);
                    break;
                }
                Err(e) => {
                    failure = Some(RunError::from(e));
                    break;
                }
            }
        }

        if let Some(err) = failure {
            error!(error = %err, "transaction failed; aborting run");
            workers.shutdown().await;
            agg_token.cancel();
            let _ = aggregator.await;
            return Err(err);
        }

        let stats = aggregator.await?;
        let summary = RunSummary::new(spawned, &stats, token.is_cancelled());
        info!(
            transactions = summary.transactions,
            average = ?summary.average,
            rate = summary.rate,
            cancelled = summary.cancelled,
            "workload finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::{Lookup, MemoryStore, Transaction, Upserted};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::sync::Notify;
    use txload_model::Step;

    fn cfg(threads: usize, count: u64) -> RunConfig {
        RunConfig {
            threads,
            count,
            size: 16,
            ..Default::default()
        }
    }

    fn runner(store: &Arc<MemoryStore>, cfg: RunConfig) -> BatchRunner<MemoryStore> {
        BatchRunner::new(Arc::clone(store), cfg, SeedSource::new(1)).with_output(std::io::sink())
    }

    #[tokio::test]
    async fn finite_run_executes_exact_count() {
        let store = Arc::new(MemoryStore::new());
        let summary = runner(&store, cfg(3, 10))
            .run(CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.workers, 3);
        assert_eq!(summary.transactions, 10);
        assert!(!summary.cancelled);
        assert_eq!(store.commits(), 10);
        assert!(summary.last.is_some());
    }

    #[tokio::test]
    async fn idle_workers_are_not_spawned() {
        let store = Arc::new(MemoryStore::new());
        let summary = runner(&store, cfg(5, 2))
            .run(CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.workers, 1);
        assert_eq!(summary.transactions, 2);
        assert_eq!(store.commits(), 2);
    }

    #[tokio::test]
    async fn small_buffer_still_delivers_everything() {
        let store = Arc::new(MemoryStore::new());
        let cfg = RunConfig {
            buffer: 1,
            ..cfg(4, 40)
        };
        let summary = runner(&store, cfg).run(CancellationToken::new()).await.unwrap();
        assert_eq!(summary.transactions, 40);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn unlimited_run_stops_on_cancel() {
        let store = Arc::new(MemoryStore::new());
        let token = CancellationToken::new();
        let handle = tokio::spawn(runner(&store, cfg(2, 0)).run(token.clone()));

        while store.commits() < 20 {
            tokio::task::yield_now().await;
        }
        token.cancel();

        let summary = handle.await.unwrap().unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.workers, 2);

        let after = store.commits();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.commits(), after, "transactions started after cancel");
    }

    #[derive(Default)]
    struct Gate {
        begins: AtomicU64,
        commits: AtomicU64,
        aborts: AtomicU64,
        entered: Notify,
        release: Notify,
    }

    /// Store whose commit parks until the test releases it.
    #[derive(Default)]
    struct GatedStore {
        gate: Arc<Gate>,
    }

    struct GatedTxn {
        gate: Arc<Gate>,
        committed: bool,
    }

    #[async_trait]
    impl Store for GatedStore {
        type Txn = GatedTxn;

        fn name(&self) -> &'static str {
            "gated"
        }

        async fn setup(&self) -> Result<(), StoreError> {
            Ok(())
        }

        fn begin(&self) -> GatedTxn {
            self.gate.begins.fetch_add(1, Ordering::SeqCst);
            GatedTxn {
                gate: Arc::clone(&self.gate),
                committed: false,
            }
        }
    }

    #[async_trait]
    impl Transaction for GatedTxn {
        async fn lookup(&mut self, _key: &str) -> Result<Lookup, StoreError> {
            Ok(Lookup {
                uid: None,
                latency: Duration::from_micros(10),
            })
        }

        async fn upsert(
            &mut self,
            _uid: Option<&str>,
            _key: &str,
            _body: &str,
        ) -> Result<Upserted, StoreError> {
            Ok(Upserted {
                uid: "0x1".to_string(),
                latency: Duration::from_micros(10),
            })
        }

        async fn commit(&mut self) -> Result<(), StoreError> {
            self.gate.entered.notify_one();
            self.gate.release.notified().await;
            self.gate.commits.fetch_add(1, Ordering::SeqCst);
            self.committed = true;
            Ok(())
        }

        async fn discard(&mut self) {
            if !self.committed {
                self.gate.aborts.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn in_flight_transaction_completes_after_cancel() {
        let store = Arc::new(GatedStore::default());
        let gate = Arc::clone(&store.gate);
        let token = CancellationToken::new();
        let run = BatchRunner::new(store, cfg(1, 0), SeedSource::new(7))
            .with_output(std::io::sink());
        let handle = tokio::spawn(run.run(token.clone()));

        gate.entered.notified().await;
        token.cancel();
        gate.release.notify_one();

        let summary = handle.await.unwrap().unwrap();
        assert!(summary.cancelled);
        assert_eq!(gate.begins.load(Ordering::SeqCst), 1);
        assert_eq!(gate.commits.load(Ordering::SeqCst), 1);
        assert_eq!(gate.aborts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_before_start_runs_nothing() {
        let store = Arc::new(MemoryStore::new());
        let token = CancellationToken::new();
        token.cancel();

        let summary = runner(&store, cfg(3, 0)).run(token).await.unwrap();
        assert_eq!(summary.transactions, 0);
        assert_eq!(store.commits(), 0);
    }

    #[tokio::test]
    async fn transaction_error_fails_the_run() {
        for step in Step::ALL {
            let store = Arc::new(MemoryStore::with_fault(step, 3));
            let err = runner(&store, cfg(2, 0))
                .run(CancellationToken::new())
                .await
                .unwrap_err();

            match err {
                RunError::Transaction { source, .. } => assert_eq!(source.step, step),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_spawning() {
        let store = Arc::new(MemoryStore::new());
        let err = runner(&store, cfg(0, 10))
            .run(CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
        assert_eq!(store.commits(), 0);
    }

    #[tokio::test]
    async fn summary_serializes_micros() {
        let store = Arc::new(MemoryStore::new());
        let summary = runner(&store, cfg(1, 3))
            .run(CancellationToken::new())
            .await
            .unwrap();

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["transactions"], 3);
        assert!(json["averageUs"].is_u64());
        assert_eq!(json["last"]["samples"].as_array().unwrap().len(), 3);
    }
}
