mod timing_sample;
pub use timing_sample::TimingSample;

mod timing_set;
pub use timing_set::TimingSet;

mod timer;
pub use timer::Timer;

mod work_item;
pub use work_item::WorkItem;

mod budget;
pub use budget::Budget;

mod step;
pub use step::{Step, StepParseError};

pub mod duration_us;

use std::time::Duration;

/// Drop everything below one microsecond.
///
/// Durations are reported at microsecond precision everywhere in the status output.
#[inline]
pub fn truncate_micros(d: Duration) -> Duration {
    Duration::from_micros(d.as_micros() as u64)
}

/// Round to the nearest microsecond (half up).
#[inline]
pub fn round_micros(d: Duration) -> Duration {
    let nanos = d.as_nanos() + 500;
    Duration::from_micros((nanos / 1_000) as u64)
}
