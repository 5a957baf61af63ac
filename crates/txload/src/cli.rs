use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use txload_core::RunConfig;
use txload_dgraph::DgraphConfig;
use txload_model::Step;
use txload_observe::{LoggerConfig, LoggerFormat};

/// Synthetic upsert workload against a graph store.
#[derive(Parser, Debug, Clone)]
#[command(name = "txload", version)]
pub struct Args {
    /// Number of parallel workers.
    #[arg(long, default_value_t = 1)]
    pub threads: usize,

    /// Length of every generated document body.
    #[arg(long, default_value_t = 10_000)]
    pub size: usize,

    /// Total transactions across all workers (0 runs until interrupted).
    #[arg(long, default_value_t = 0)]
    pub count: u64,

    /// Comma-separated store endpoints, e.g. `alpha1:9080,alpha2:9080`.
    #[arg(long, default_value = "localhost:9080")]
    pub hosts: String,

    #[arg(long, value_enum, default_value_t = Backend::Dgraph)]
    pub backend: Backend,

    /// Base seed for the per-worker generators (0 derives one from the clock).
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Capacity of the results channel.
    #[arg(long, default_value_t = 4096)]
    pub buffer: usize,

    /// Do not provision the schema before the run.
    #[arg(long)]
    pub skip_setup: bool,

    /// Write Prometheus text exposition to this path when the run ends.
    #[arg(long)]
    pub metrics_out: Option<PathBuf>,

    /// Write the run summary as JSON to this path.
    #[arg(long)]
    pub summary_out: Option<PathBuf>,

    /// Inject a failure at this step (memory backend only).
    #[arg(long)]
    pub fail_at: Option<Step>,

    /// Successful calls of the `--fail-at` step before the failure fires.
    #[arg(long, default_value_t = 0)]
    pub fail_after: u64,

    /// Log filter directive, e.g. `info` or `txload_core=debug`.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[arg(long, default_value = "text")]
    pub log_format: LoggerFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Dgraph,
    Memory,
}

impl Args {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            threads: self.threads,
            size: self.size,
            count: self.count,
            buffer: self.buffer,
            ..Default::default()
        }
    }

    pub fn dgraph_config(&self) -> DgraphConfig {
        DgraphConfig::from_hosts(&self.hosts)
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            format: self.log_format,
            level: self.log_level.clone(),
            ..Default::default()
        }
    }
}
