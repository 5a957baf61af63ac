pub mod error;
pub use error::{RunError, StoreError, TxnError};

pub mod config;
pub use config::RunConfig;

pub mod store;
pub use store::{Lookup, MemoryStore, Store, Transaction, Upserted};

pub mod exec;
pub use exec::{Completed, Executor};

pub mod seed;
pub use seed::SeedSource;

pub mod payload;

pub mod metrics;
pub use metrics::{MetricsBackend, MetricsHandle, NoopMetrics};

pub mod progress;
pub use progress::{AggregateStats, Aggregator};

pub mod runner;
pub use runner::{BatchRunner, RunSummary, split_budgets};

pub mod lifecycle;
pub use lifecycle::{Escalation, Lifecycle, LifecycleState};

pub mod prelude {
    pub use crate::error::{RunError, StoreError, TxnError};
    pub use crate::store::{Store, Transaction};
    pub use crate::{BatchRunner, Lifecycle, RunConfig, SeedSource};
}
