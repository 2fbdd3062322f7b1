use std::fmt;
use std::io;

/// Errors that can occur while archiving or extracting.
///
/// Variants carry only the failure kind and the underlying cause. The paths
/// and entry names involved are reported through the injected
/// [`Logger`](crate::Logger) at the point of failure, not through the error
/// value.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in minor versions without breaking existing code. Always include a
/// catch-all `_ =>` arm when matching.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A file or directory could not be created.
    Create(io::Error),

    /// A source file or the archive file could not be opened.
    Open(io::Error),

    /// Copying bytes between a file and an archive entry failed.
    Copy(io::Error),

    /// Deleting the source directory or the archive file failed.
    Remove(io::Error),

    /// The directory traversal failed.
    Walk(walkdir::Error),

    /// Zip format error (unreadable central directory, entry header
    /// failure, finalization failure).
    Archive(zip::result::ZipError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(e) => write!(f, "failed to create file or directory: {}", e),
            Self::Open(e) => write!(f, "failed to open file: {}", e),
            Self::Copy(e) => write!(f, "failed to copy data: {}", e),
            Self::Remove(e) => write!(f, "failed to remove path: {}", e),
            Self::Walk(e) => write!(f, "directory walk failed: {}", e),
            Self::Archive(e) => write!(f, "zip format error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Create(e) => Some(e),
            Self::Open(e) => Some(e),
            Self::Copy(e) => Some(e),
            Self::Remove(e) => Some(e),
            Self::Walk(e) => Some(e),
            Self::Archive(e) => Some(e),
        }
    }
}

// No From conversions: an io::Error maps to a different variant depending on
// the operation that produced it, so classification stays at the call site.
