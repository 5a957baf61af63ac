//! Root cancellation context bound to process signals.
//!
//! | state      | interrupt  | next       | effect                                    |
//! |------------|------------|------------|-------------------------------------------|
//! | Running    | first      | Cancelling | cancel root token, workers drain          |
//! | Cancelling | any later  | (exit)     | forced exit hook runs, no drain           |
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    Cancelling,
}

/// What the signal listener must do after an interrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Root token cancelled; in-flight work finishes.
    Drain,
    /// Shutdown already requested; leave immediately.
    ForceExit,
}

#[derive(Debug, Default)]
pub struct Lifecycle {
    token: CancellationToken,
    cancelling: AtomicBool,
}

impl Lifecycle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Root token every task of the run is bound to.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn state(&self) -> LifecycleState {
        if self.cancelling.load(Ordering::Acquire) {
            LifecycleState::Cancelling
        } else {
            LifecycleState::Running
        }
    }

    /// Apply one interrupt to the state machine.
    pub fn on_interrupt(&self) -> Escalation {
        if self.cancelling.swap(true, Ordering::AcqRel) {
            return Escalation::ForceExit;
        }
        self.token.cancel();
        Escalation::Drain
    }

    /// Spawn the signal listener (SIGINT, plus SIGTERM on unix).
    ///
    /// The first signal cancels the root token; the second one calls `force_exit`, which is
    /// expected not to return (the binary passes `process::exit(1)`).
    pub fn listen<F>(self: &Arc<Self>, force_exit: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let this = Arc::clone(self);
        tokio::spawn(async move {
            match Signals::new() {
                Ok(signals) => this.serve(signals, force_exit).await,
                Err(e) => error!(error = %e, "failed to install signal handlers"),
            }
        })
    }

    /// Feed interrupts from `signals` into the state machine until exit is forced or the
    /// source fails.
    ///
    /// Notices are printed to stderr regardless of the log filter.
    pub(crate) async fn serve<S, F>(&self, mut signals: S, force_exit: F)
    where
        S: SignalSource,
        F: FnOnce(),
    {
        loop {
            if let Err(e) = signals.recv().await {
                error!(error = %e, "signal listener failed");
                return;
            }
            match self.on_interrupt() {
                Escalation::Drain => {
                    eprintln!("received interrupt, finishing in-flight transactions...");
                    info!("shutdown requested; draining");
                }
                Escalation::ForceExit => {
                    eprintln!("received interrupt during shutdown, exiting...");
                    info!("second interrupt; forcing exit");
                    force_exit();
                    return;
                }
            }
        }
    }
}

/// Source of interrupt notifications.
#[async_trait]
pub(crate) trait SignalSource: Send {
    async fn recv(&mut self) -> std::io::Result<()>;
}

#[cfg(unix)]
struct Signals {
    int: tokio::signal::unix::Signal,
    term: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn new() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            int: signal(SignalKind::interrupt())?,
            term: signal(SignalKind::terminate())?,
        })
    }
}

#[cfg(unix)]
#[async_trait]
impl SignalSource for Signals {
    async fn recv(&mut self) -> std::io::Result<()> {
        tokio::select! {
            _ = self.int.recv() => Ok(()),
            _ = self.term.recv() => Ok(()),
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn new() -> std::io::Result<Self> {
        Ok(Self)
    }
}

#[cfg(not(unix))]
#[async_trait]
impl SignalSource for Signals {
    async fn recv(&mut self) -> std::io::Result<()> {
        tokio::signal::ctrl_c().await
    }
}
