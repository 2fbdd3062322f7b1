use std::path::PathBuf;

/// Settings consumed by [`Logger::new`](crate::Logger::new).
///
/// The default is a quiet logger writing to
/// [`DEFAULT_LOG_PATH`](crate::DEFAULT_LOG_PATH).
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Echo every record to stderr in addition to the log file.
    pub debug: bool,

    /// Log file location. `None` selects the default path.
    pub log_file_path: Option<PathBuf>,
}
