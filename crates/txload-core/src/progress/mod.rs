//! Live progress line fed by the results channel.
//!
//! The aggregator is the only reader of the channel and the only writer of its stats. It waits
//! for one timing set, sweeps whatever else is already queued without waiting, then redraws the
//! status line. Cancellation stops it at the next check; samples still queued at that point are
//! dropped.
use std::io::Write;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use txload_model::{TimingSet, round_micros};

/// Running totals over every received transaction.
#[derive(Debug, Clone)]
pub struct AggregateStats {
    count: u64,
    total: Duration,
    started: Instant,
    last: Option<TimingSet>,
}

impl Default for AggregateStats {
    fn default() -> Self {
        Self::starting_at(Instant::now())
    }
}

impl AggregateStats {
    pub fn starting_at(started: Instant) -> Self {
        Self {
            count: 0,
            total: Duration::ZERO,
            started,
            last: None,
        }
    }

    pub fn record(&mut self, set: TimingSet) {
        self.count += 1;
        self.total += set.total();
        self.last = Some(set);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of the totals of every received set.
    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn last(&self) -> Option<&TimingSet> {
        self.last.as_ref()
    }

    /// Mean transaction duration, rounded to the microsecond.
    pub fn average(&self) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }
        let nanos = self.total.as_nanos() / u128::from(self.count);
        round_micros(Duration::from_nanos(nanos as u64))
    }

    /// Whole transactions per second since start.
    pub fn rate(&self, now: Instant) -> u64 {
        let secs = now.saturating_duration_since(self.started).as_secs_f64();
        if secs <= 0.0 {
            return 0;
        }
        (self.count as f64 / secs) as u64
    }

    /// Status line without terminal control codes.
    pub fn status_line(&self, now: Instant) -> String {
        let avg = format!("{:?}", self.average());
        let last = self.last.as_ref().map(TimingSet::render).unwrap_or_default();
        format!(
            "count: {:5} avg: {avg:<8} rate: {:<4}/s last: {last}",
            self.count,
            self.rate(now)
        )
    }
}

/// Erase the current line and return the cursor to its start.
const CLEAR_LINE: &str = "\x1b[2K\r";

pub struct Aggregator {
    rx: mpsc::Receiver<TimingSet>,
    token: CancellationToken,
    out: Box<dyn Write + Send>,
    stats: AggregateStats,
}

impl Aggregator {
    pub fn new(
        rx: mpsc::Receiver<TimingSet>,
        token: CancellationToken,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            rx,
            token,
            out,
            stats: AggregateStats::default(),
        }
    }

    /// Drive the aggregator until cancellation or until every sender is gone.
    pub async fn run(mut self) -> AggregateStats {
        loop {
            let first = tokio::select! {
                biased;
                _ = self.token.cancelled() => break,
                next = self.rx.recv() => match next {
                    Some(set) => set,
                    None => break,
                },
            };
            self.stats.record(first);

            if !self.drain() {
                break;
            }
            self.render();
        }

        self.finish();
        self.stats
    }

    /// Consume everything already queued. Returns `false` once cancelled.
    fn drain(&mut self) -> bool {
        loop {
            if self.token.is_cancelled() {
                return false;
            }
            match self.rx.try_recv() {
                Ok(set) => self.stats.record(set),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return true,
            }
        }
    }

    fn render(&mut self) {
        let line = self.stats.status_line(Instant::now());
        if let Err(e) = write!(self.out, "{CLEAR_LINE}{line}").and_then(|_| self.out.flush()) {
            trace!(error = %e, "status line write failed");
        }
    }

    fn finish(&mut self) {
        if let Err(e) = writeln!(self.out).and_then(|_| self.out.flush()) {
            trace!(error = %e, "status line write failed");
        }
        debug!(count = self.stats.count, "aggregator stopped");
    }
}
