use crate::logger::format::LoggerFormat;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `txload_core=debug,warn`.
    pub level: String,
    pub with_targets: bool,
    /// ANSI colours in text output.
    pub use_color: bool,
    /// Erase the status line on stdout before each record so the two don't share a row.
    pub clear_status_line: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: false,
            use_color: atty::is(atty::Stream::Stderr),
            clear_status_line: atty::is(atty::Stream::Stdout) && atty::is(atty::Stream::Stderr),
        }
    }
}
