//! Store boundary used by the transaction executor.
//!
//! Backends expose a transaction handle with three fallible steps plus a best-effort release.
//! Latencies returned by `lookup` and `upsert` are the store's own processing time, not the
//! round trip observed by the caller.
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

mod memory;
pub use memory::MemoryStore;

/// Result of looking a document up by key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Identifier of the existing record, if any.
    pub uid: Option<String>,
    /// Server-side processing latency.
    pub latency: Duration,
}

/// Result of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    /// Identifier of the written record (newly assigned when the record was created).
    pub uid: String,
    /// Server-side processing latency.
    pub latency: Duration,
}

#[async_trait]
pub trait Store: Send + Sync + 'static {
    type Txn: Transaction;

    fn name(&self) -> &'static str;

    /// Provision whatever schema the workload needs. Called once before any worker starts.
    async fn setup(&self) -> Result<(), StoreError>;

    /// Open a new transaction.
    fn begin(&self) -> Self::Txn;
}

#[async_trait]
pub trait Transaction: Send {
    async fn lookup(&mut self, key: &str) -> Result<Lookup, StoreError>;

    /// Create a record when `uid` is `None`, otherwise overwrite the record `uid`.
    async fn upsert(
        &mut self,
        uid: Option<&str>,
        key: &str,
        body: &str,
    ) -> Result<Upserted, StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Release the transaction. A no-op after a successful commit; never fails the caller.
    async fn discard(&mut self);
}
