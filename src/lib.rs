mod archiver;
mod config;
mod error;
mod extractor;
mod logger;

pub use archiver::Archiver;
pub use config::Config;
pub use error::Error;
pub use extractor::Extractor;
pub use logger::{Logger, DEFAULT_LOG_PATH};

/// Convenience function to compress a directory with default settings.
pub fn archive_dir<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
    source_dir: P,
    target: Q,
) -> Result<(), Error> {
    let log = std::sync::Arc::new(Logger::new(&Config::default()));
    Archiver::new(log).archive(source_dir, target)
}

/// Convenience function to extract a zip file with default settings.
pub fn extract_file<P: AsRef<std::path::Path>, Q: AsRef<std::path::Path>>(
    archive_path: P,
    target_dir: Q,
) -> Result<(), Error> {
    let log = std::sync::Arc::new(Logger::new(&Config::default()));
    Extractor::new(log).extract(archive_path, target_dir)
}
