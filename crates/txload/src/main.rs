mod cli;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{info, warn};
use txload_core::prelude::*;
use txload_core::{MemoryStore, MetricsHandle, NoopMetrics, RunSummary};
use txload_dgraph::DgraphStore;
use txload_observe::logger_init;
use txload_prometheus::PrometheusMetrics;

use crate::cli::{Args, Backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger_init(&args.logger_config()).context("failed to initialize logger")?;

    let lifecycle = Lifecycle::new();
    let _signals = lifecycle.listen(|| std::process::exit(1));

    let metrics = match &args.metrics_out {
        Some(_) => Some(PrometheusMetrics::new().context("failed to create metrics registry")?),
        None => None,
    };
    let handle: MetricsHandle = match &metrics {
        Some(m) => Arc::new(m.clone()),
        None => NoopMetrics::handle(),
    };

    let summary = match args.backend {
        Backend::Dgraph => {
            if args.fail_at.is_some() {
                bail!("--fail-at is only supported with --backend memory");
            }
            let store = DgraphStore::connect(&args.dgraph_config())
                .await
                .with_context(|| format!("failed to connect to {}", args.hosts))?;
            run(Arc::new(store), &args, &lifecycle, handle).await?
        }
        Backend::Memory => {
            let store = match args.fail_at {
                Some(step) => MemoryStore::with_fault(step, args.fail_after),
                None => MemoryStore::new(),
            };
            run(Arc::new(store), &args, &lifecycle, handle).await?
        }
    };

    if let Some(path) = &args.summary_out {
        write_summary(path, &summary)?;
    }
    if let (Some(path), Some(m)) = (&args.metrics_out, &metrics) {
        let text = m.encode().context("failed to encode metrics")?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write metrics to {}", path.display()))?;
        info!(path = %path.display(), "metrics written");
    }
    Ok(())
}

async fn run<S: Store>(
    store: Arc<S>,
    args: &Args,
    lifecycle: &Lifecycle,
    metrics: MetricsHandle,
) -> anyhow::Result<RunSummary> {
    if args.skip_setup {
        warn!(store = store.name(), "schema setup skipped");
    } else {
        store.setup().await.context("schema setup failed")?;
    }

    let seeds = if args.seed == 0 {
        SeedSource::from_clock()
    } else {
        SeedSource::new(args.seed)
    };

    let summary = BatchRunner::new(store, args.run_config(), seeds)
        .with_metrics(metrics)
        .run(lifecycle.token())
        .await?;
    Ok(summary)
}

fn write_summary(path: &Path, summary: &RunSummary) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(summary).context("failed to encode summary")?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write summary to {}", path.display()))?;
    info!(path = %path.display(), "summary written");
    Ok(())
}
