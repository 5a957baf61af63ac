mod config;
mod error;
mod format;
mod init;
mod writer;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;
pub use init::logger_init;
pub use writer::StatusAwareStderr;
