use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Timer, TimingSample, truncate_micros};

/// Ordered timings of a single transaction.
///
/// A set is filled by exactly one worker while the transaction runs and is then moved to the
/// aggregator as a whole. Samples keep the order in which they were measured.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingSet {
    samples: Vec<TimingSample>,
}

impl TimingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start measuring `name`; the sample is appended when the returned timer stops or drops.
    pub fn start(&mut self, name: impl Into<String>) -> Timer<'_> {
        Timer::new(self, name.into())
    }

    /// Append a pre-computed sample (e.g. a latency reported by the store itself).
    pub fn add(&mut self, name: impl Into<String>, duration: Duration) {
        self.samples.push(TimingSample::new(name, duration));
    }

    /// Sum of all sample durations. Zero for an empty set.
    pub fn total(&self) -> Duration {
        self.samples.iter().map(|s| s.duration).sum()
    }

    pub fn samples(&self) -> &[TimingSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Compact one-line report: `<total>  <name>: <dur>  ...`.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TimingSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = format!("{:?}", truncate_micros(self.total()));
        write!(f, "{total:<8}")?;
        for s in &self.samples {
            let dur = format!("{:?}", truncate_micros(s.duration));
            write!(f, "  {}: {dur:<8}", s.name)?;
        }
        Ok(())
    }
}
