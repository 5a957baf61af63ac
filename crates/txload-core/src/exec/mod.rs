//! One find-or-create-then-update transaction.
//!
//! | step   | sample      | duration source                      |
//! |--------|-------------|--------------------------------------|
//! | lookup | `lookupDoc` | processing latency reported by store |
//! | update | `updateDoc` | processing latency reported by store |
//! | commit | `commit`    | local wall clock around the call     |
use std::sync::Arc;

use tracing::trace;
use txload_model::{Step, TimingSet, WorkItem};

use crate::error::TxnError;
use crate::store::{Store, Transaction};

/// A committed transaction.
#[derive(Debug, Clone)]
pub struct Completed {
    pub timings: TimingSet,
    /// Identifier of the written record.
    pub uid: String,
    /// `true` when the lookup found nothing and a new record was created.
    pub created: bool,
}

pub struct Executor<S> {
    store: Arc<S>,
}

impl<S> Clone for Executor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: Store> Executor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Run the whole cycle in a fresh transaction.
    ///
    /// The transaction is discarded on every exit path; after a successful commit the discard
    /// is a no-op. Any step error aborts the transaction and is returned tagged with its step.
    pub async fn run(&self, item: &WorkItem) -> Result<Completed, TxnError> {
        let mut txn = self.store.begin();
        let res = upsert_cycle(&mut txn, item).await;
        txn.discard().await;
        res
    }
}

async fn upsert_cycle<T: Transaction>(
    txn: &mut T,
    item: &WorkItem,
) -> Result<Completed, TxnError> {
    let mut timings = TimingSet::new();

    let found = txn
        .lookup(&item.key)
        .await
        .map_err(TxnError::at(Step::Lookup))?;
    timings.add(Step::Lookup.label(), found.latency);

    let created = found.uid.is_none();
    let written = txn
        .upsert(found.uid.as_deref(), &item.key, &item.body)
        .await
        .map_err(TxnError::at(Step::Update))?;
    timings.add(Step::Update.label(), written.latency);

    {
        let _commit = timings.start(Step::Commit.label());
        txn.commit().await.map_err(TxnError::at(Step::Commit))?;
    }

    trace!(uid = %written.uid, created, "transaction committed");
    Ok(Completed {
        timings,
        uid: written.uid,
        created,
    })
}
