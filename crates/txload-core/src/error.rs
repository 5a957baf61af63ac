use thiserror::Error;
use txload_model::Step;

/// Failure reported by a store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store rejected request: {0}")]
    Rejected(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("transaction aborted by store")]
    Aborted,
    #[error("transaction already finished")]
    Finished,
    #[error("injected fault at {0}")]
    Injected(Step),
}

/// Store failure tagged with the transaction step it happened in.
#[derive(Debug, Error)]
#[error("{step} failed: {source}")]
pub struct TxnError {
    pub step: Step,
    #[source]
    pub source: StoreError,
}

impl TxnError {
    pub fn new(step: Step, source: StoreError) -> Self {
        Self { step, source }
    }

    /// Adapter for `map_err`.
    pub(crate) fn at(step: Step) -> impl FnOnce(StoreError) -> TxnError {
        move |source| TxnError::new(step, source)
    }
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid run config: {0}")]
    Config(String),
    #[error("worker {worker}: {source}")]
    Transaction {
        worker: usize,
        #[source]
        source: TxnError,
    },
    #[error("task join failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for RunError {
    fn from(e: tokio::task::JoinError) -> Self {
        RunError::Join(e.to_string())
    }
}
