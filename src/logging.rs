use crate::Result;
use flexi_logger::{opt_format, Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming};
use std::path::Path;

/// Starts the global logger.
///
/// The level comes from `RUST_LOG`, falling back to `info`. Without a
/// directory logs go to stderr; with one they go to rotating files there.
/// Keep the returned handle alive for as long as logging is needed.
pub fn setup_logging(log_dir: Option<&Path>) -> Result<LoggerHandle> {
    let logger = Logger::try_with_env_or_str("info")?;

    let handle = match log_dir {
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir))
            .format(opt_format)
            .rotate(
                Criterion::Size(10 * 1024 * 1024), // Rotate logs after they reach 10 MB
                Naming::Numbers,
                Cleanup::KeepLogFiles(7),
            )
            .start()?,
        None => logger
            .format(flexi_logger::colored_default_format)
            .start()?,
    };

    Ok(handle)
}
