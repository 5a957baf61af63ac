//! Logging setup for txload binaries.
//!
//! Logs always go to stderr: stdout is reserved for the live status line.
mod logger;
pub use logger::*;
