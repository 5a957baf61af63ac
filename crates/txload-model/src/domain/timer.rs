use std::time::{Duration, Instant};

use crate::TimingSet;

/// Running measurement started by [`TimingSet::start`].
///
/// The sample is recorded exactly once: either by [`Timer::stop`] or when the timer is dropped,
/// so an early `?` return still leaves the partial timing in the set.
#[must_use = "the sample is recorded when the timer is stopped or dropped"]
pub struct Timer<'a> {
    set: &'a mut TimingSet,
    name: Option<String>,
    started: Instant,
}

impl<'a> Timer<'a> {
    pub(crate) fn new(set: &'a mut TimingSet, name: String) -> Self {
        Self {
            set,
            name: Some(name),
            started: Instant::now(),
        }
    }

    /// Stop the timer and return the recorded duration.
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        match self.name.take() {
            Some(name) => {
                let elapsed = self.started.elapsed();
                self.set.add(name, elapsed);
                elapsed
            }
            None => Duration::ZERO,
        }
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        self.record();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_records_once() {
        let mut set = TimingSet::new();
        let elapsed = set.start("commit").stop();

        assert_eq!(set.len(), 1);
        assert_eq!(set.samples()[0].name, "commit");
        assert_eq!(set.samples()[0].duration, elapsed);
    }

    #[test]
    fn drop_records_on_early_return() {
        fn failing(set: &mut TimingSet) -> Result<(), &'static str> {
            let _t = set.start("commit");
            let res: Result<(), &'static str> = Err("boom");
            res?;
            Ok(())
        }

        let mut set = TimingSet::new();
        assert!(failing(&mut set).is_err());
        assert_eq!(set.len(), 1);
        assert_eq!(set.samples()[0].name, "commit");
    }
}
