//! Prometheus metrics backend for txload workloads.
//!
//! [`PrometheusMetrics`] implements [`txload_core::MetricsBackend`] on top of its own
//! [`Registry`]. The load generator has no HTTP surface; the registry is rendered once in
//! text exposition format when the run ends.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use txload_core::MetricsHandle;
//! use txload_prometheus::PrometheusMetrics;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let metrics = PrometheusMetrics::new()?;
//! let handle: MetricsHandle = Arc::new(metrics.clone());
//! // hand `handle` to BatchRunner::with_metrics, run, then:
//! let text = metrics.encode()?;
//! assert!(text.contains("txload_transactions_total"));
//! # let _ = handle;
//! # Ok(())
//! # }
//! ```
//!
//! ## Metrics
//! - `txload_transactions_total` - Counter
//! - `txload_transaction_failures_total{step}` - Counter
//! - `txload_step_duration_seconds{step}` - Histogram
//! - `txload_transaction_duration_seconds` - Histogram

mod backend;
pub use backend::{PrometheusError, PrometheusMetrics};

pub use prometheus::{Encoder, Registry, TextEncoder};
