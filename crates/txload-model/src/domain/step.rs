use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Steps of the upsert transaction, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    Lookup,
    Update,
    Commit,
}

impl Step {
    pub const ALL: [Step; 3] = [Step::Lookup, Step::Update, Step::Commit];

    /// Label used for the step's timing sample.
    pub fn label(&self) -> &'static str {
        match self {
            Step::Lookup => "lookupDoc",
            Step::Update => "updateDoc",
            Step::Commit => "commit",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
#[error("invalid step: {0} (expected: lookup|update|commit)")]
pub struct StepParseError(pub String);

impl FromStr for Step {
    type Err = StepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase();
        match norm.as_str() {
            "lookup" | "lookupdoc" => Ok(Step::Lookup),
            "update" | "updatedoc" => Ok(Step::Update),
            "commit" => Ok(Step::Commit),
            _ => Err(StepParseError(s.to_string())),
        }
    }
}
