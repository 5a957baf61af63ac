use std::fmt;

/// Number of transactions a single worker is allowed to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// Run exactly `n` transactions.
    Fixed(u64),
    /// Run until cancelled.
    Unlimited,
}

impl Budget {
    /// Returns `true` if another iteration may start after `done` completed ones.
    #[inline]
    pub fn allows(&self, done: u64) -> bool {
        match self {
            Budget::Fixed(n) => done < *n,
            Budget::Unlimited => true,
        }
    }

    /// Returns `true` if the worker would never start a transaction.
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Budget::Fixed(0))
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Budget::Fixed(n) => write!(f, "{n}"),
            Budget::Unlimited => f.write_str("unlimited"),
        }
    }
}
