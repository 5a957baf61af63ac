use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One labelled interval inside a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingSample {
    /// Step label, e.g. `lookupDoc`.
    pub name: String,
    /// Measured or store-reported duration.
    #[serde(rename = "durationUs", with = "crate::duration_us")]
    pub duration: Duration,
}

impl TimingSample {
    pub fn new(name: impl Into<String>, duration: Duration) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}
