use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, fmt::time::OffsetTime, layer::Layered, layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::logger::{
    config::LoggerConfig, error::LoggerError, format::LoggerFormat, writer::StatusAwareStderr,
};

type Filtered = Layered<EnvFilter, Registry>;

/// Install the global subscriber described by `cfg`.
///
/// Output goes to stderr; stdout belongs to the status line. Fails if a global subscriber is
/// already set.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let base = tracing_subscriber::registry().with(filter(&cfg.level)?);
    let clear = cfg.clear_status_line;

    match cfg.format {
        LoggerFormat::Text => base
            .with(
                fmt::layer()
                    .with_writer(move || StatusAwareStderr::new(clear))
                    .with_ansi(cfg.use_color)
                    .with_target(cfg.with_targets)
                    .with_timer(local_timer()),
            )
            .try_init()?,
        LoggerFormat::Json => base
            .with(
                fmt::layer()
                    .json()
                    .with_writer(move || StatusAwareStderr::new(clear))
                    .with_ansi(false)
                    .with_target(cfg.with_targets)
                    .with_timer(local_timer()),
            )
            .try_init()?,
        LoggerFormat::Journald => journald(base)?,
    }
    Ok(())
}

fn filter(directive: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(directive).map_err(|e| LoggerError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

fn local_timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald(base: Filtered) -> Result<(), LoggerError> {
    let layer = tracing_journald::layer().map_err(|e| LoggerError::Journald(e.to_string()))?;
    base.with(layer).try_init()?;
    Ok(())
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald(_base: Filtered) -> Result<(), LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}
