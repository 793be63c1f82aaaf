use flexi_logger::{FlexiLoggerError, Logger, LoggerHandle};

/// Starts logging to stderr, filtered by `RUST_LOG` (default `warn`).
///
/// stdout carries only command results.
pub fn init() -> Result<LoggerHandle, FlexiLoggerError> {
    Logger::try_with_env_or_str("warn")?.log_to_stderr().start()
}
