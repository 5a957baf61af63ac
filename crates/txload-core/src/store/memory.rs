use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::trace;
use txload_model::Step;

use crate::error::StoreError;
use crate::store::{Lookup, Store, Transaction, Upserted};

/// In-process store with commit-time visibility.
///
/// Writes are staged per transaction and applied on commit; a discarded transaction leaves no
/// trace. Faults can be injected per step to exercise the failure path of a run.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    fault: Option<Fault>,
    schema_ready: AtomicBool,
    next_uid: AtomicU64,
    commits: AtomicU64,
    aborts: AtomicU64,
}

#[derive(Default)]
struct State {
    /// docKey -> uid
    by_key: HashMap<String, String>,
    /// uid -> body
    bodies: HashMap<String, String>,
}

struct Fault {
    step: Step,
    /// Calls of `step` that succeed before the fault fires.
    after: u64,
    seen: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every call of `step` once it has succeeded `after` times.
    pub fn with_fault(step: Step, after: u64) -> Self {
        Self {
            inner: Arc::new(Inner {
                fault: Some(Fault {
                    step,
                    after,
                    seen: AtomicU64::new(0),
                }),
                ..Default::default()
            }),
        }
    }

    /// Number of committed records.
    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.by_key.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Committed `(uid, body)` for `key`.
    pub async fn get(&self, key: &str) -> Option<(String, String)> {
        let state = self.inner.state.lock().await;
        let uid = state.by_key.get(key)?;
        let body = state.bodies.get(uid)?;
        Some((uid.clone(), body.clone()))
    }

    pub fn commits(&self) -> u64 {
        self.inner.commits.load(Ordering::Relaxed)
    }

    /// Transactions released without a commit.
    pub fn aborts(&self) -> u64 {
        self.inner.aborts.load(Ordering::Relaxed)
    }

    pub fn schema_ready(&self) -> bool {
        self.inner.schema_ready.load(Ordering::Relaxed)
    }
}

impl Inner {
    fn check(&self, step: Step) -> Result<(), StoreError> {
        match &self.fault {
            Some(f) if f.step == step => {
                if f.seen.fetch_add(1, Ordering::Relaxed) >= f.after {
                    Err(StoreError::Injected(step))
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    type Txn = MemoryTxn;

    fn name(&self) -> &'static str {
        "memory"
    }

    async fn setup(&self) -> Result<(), StoreError> {
        self.inner.schema_ready.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn begin(&self) -> MemoryTxn {
        MemoryTxn {
            inner: Arc::clone(&self.inner),
            staged: Vec::new(),
            finished: false,
        }
    }
}

pub struct MemoryTxn {
    inner: Arc<Inner>,
    /// (key, uid, body)
    staged: Vec<(String, String, String)>,
    finished: bool,
}

impl MemoryTxn {
    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.finished {
            return Err(StoreError::Finished);
        }
        Ok(())
    }
}

#[async_trait]
impl Transaction for MemoryTxn {
    async fn lookup(&mut self, key: &str) -> Result<Lookup, StoreError> {
        self.ensure_open()?;
        self.inner.check(Step::Lookup)?;

        let started = Instant::now();
        let uid = self.inner.state.lock().await.by_key.get(key).cloned();
        Ok(Lookup {
            uid,
            latency: started.elapsed(),
        })
    }

    async fn upsert(
        &mut self,
        uid: Option<&str>,
        key: &str,
        body: &str,
    ) -> Result<Upserted, StoreError> {
        self.ensure_open()?;
        self.inner.check(Step::Update)?;

        let started = Instant::now();
        let uid = match uid {
            Some(uid) => uid.to_string(),
            None => {
                let n = self.inner.next_uid.fetch_add(1, Ordering::Relaxed) + 1;
                format!("{n:#x}")
            }
        };
        self.staged.push((key.to_string(), uid.clone(), body.to_string()));
        Ok(Upserted {
            uid,
            latency: started.elapsed(),
        })
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.inner.check(Step::Commit)?;

        // Suspension point in place of a network round trip.
        tokio::task::yield_now().await;

        let mut state = self.inner.state.lock().await;
        for (key, uid, body) in self.staged.drain(..) {
            state.by_key.insert(key, uid.clone());
            state.bodies.insert(uid, body);
        }
        drop(state);

        self.finished = true;
        self.inner.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn discard(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        self.staged.clear();
        self.inner.aborts.fetch_add(1, Ordering::Relaxed);
        trace!("memory transaction discarded");
    }
}
