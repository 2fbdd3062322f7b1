use std::fs::{self, File};
use std::io;
use std::path::Path;
use std::sync::Arc;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Error;
use crate::logger::Logger;

/// Compresses a directory tree into a zip archive.
///
/// Entry names are the walked paths relative to the source directory, with
/// `/` separators. Directories become explicit zero-length entries carrying
/// the trailing `/` marker; files are deflate-compressed.
pub struct Archiver {
    log: Arc<Logger>,
}

impl Archiver {
    pub fn new(log: Arc<Logger>) -> Self {
        Self { log }
    }

    /// Compress `source_dir` into a zip archive at `target`.
    ///
    /// Any existing file at `target` is replaced; there are no append or
    /// merge semantics. Every failure is fatal, is logged with the paths
    /// involved, and leaves whatever was already written at `target` on
    /// disk (typically a truncated archive).
    ///
    /// # Errors
    ///
    /// [`Error::Create`] if the archive file cannot be created,
    /// [`Error::Walk`] if the traversal fails (including a missing
    /// `source_dir`), [`Error::Open`] if a walked file cannot be opened,
    /// [`Error::Copy`] if streaming a file's bytes fails, and
    /// [`Error::Archive`] for entry header or finalization failures.
    pub fn archive<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source_dir: P,
        target: Q,
    ) -> Result<(), Error> {
        self.archive_impl(source_dir.as_ref(), target.as_ref())
    }

    /// Compress `source_dir` into `target`, then delete `source_dir`
    /// recursively.
    ///
    /// The source is removed only after the archive was written completely;
    /// on failure it is left in place and the failure is returned unchanged.
    /// A removal failure after a successful archive surfaces as
    /// [`Error::Remove`], with the finished archive still on disk.
    pub fn archive_and_delete<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source_dir: P,
        target: Q,
    ) -> Result<(), Error> {
        let source_dir = source_dir.as_ref();
        if let Err(e) = self.archive_impl(source_dir, target.as_ref()) {
            self.log.error(
                "archiving failed",
                [
                    ("dir", source_dir.display().to_string()),
                    ("error", e.to_string()),
                ],
            );
            return Err(e);
        }
        if let Err(e) = fs::remove_dir_all(source_dir) {
            self.log.error(
                "failed to remove source directory",
                [
                    ("dir", source_dir.display().to_string()),
                    ("error", e.to_string()),
                ],
            );
            return Err(Error::Remove(e));
        }
        Ok(())
    }

    fn archive_impl(&self, source_dir: &Path, target: &Path) -> Result<(), Error> {
        // Archiving never appends; a stale archive at the target is replaced.
        let _ = fs::remove_file(target);

        let file = match File::create(target) {
            Ok(f) => f,
            Err(e) => {
                self.log.error(
                    "failed to create archive file",
                    [
                        ("target", target.display().to_string()),
                        ("error", e.to_string()),
                    ],
                );
                return Err(Error::Create(e));
            }
        };

        // On every early return below the writer is dropped unfinished,
        // which finalizes best-effort and leaves a partial archive behind.
        let mut zip = ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in WalkDir::new(source_dir).min_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    self.log.error(
                        "directory walk failed",
                        [
                            ("dir", source_dir.display().to_string()),
                            ("error", e.to_string()),
                        ],
                    );
                    return Err(Error::Walk(e));
                }
            };
            let path = entry.path();

            // Walked paths are rooted under source_dir, so the strip cannot
            // fail.
            let Ok(rel) = path.strip_prefix(source_dir) else {
                continue;
            };
            let name = rel.to_string_lossy().replace('\\', "/");

            if entry.file_type().is_dir() {
                // add_directory appends the trailing '/' marker itself.
                if let Err(e) = zip.add_directory(name, options) {
                    self.log.error(
                        "failed to add directory entry",
                        [
                            ("path", path.display().to_string()),
                            ("error", e.to_string()),
                        ],
                    );
                    return Err(Error::Archive(e));
                }
                continue;
            }

            if let Err(e) = zip.start_file(name, options) {
                self.log.error(
                    "failed to add file entry",
                    [
                        ("path", path.display().to_string()),
                        ("error", e.to_string()),
                    ],
                );
                return Err(Error::Archive(e));
            }
            let mut src = match File::open(path) {
                Ok(f) => f,
                Err(e) => {
                    self.log.error(
                        "failed to open source file",
                        [
                            ("path", path.display().to_string()),
                            ("error", e.to_string()),
                        ],
                    );
                    return Err(Error::Open(e));
                }
            };
            if let Err(e) = io::copy(&mut src, &mut zip) {
                self.log.error(
                    "failed to copy file into archive",
                    [
                        ("path", path.display().to_string()),
                        ("error", e.to_string()),
                    ],
                );
                return Err(Error::Copy(e));
            }
        }

        if let Err(e) = zip.finish() {
            self.log.error(
                "failed to finalize archive",
                [
                    ("target", target.display().to_string()),
                    ("error", e.to_string()),
                ],
            );
            return Err(Error::Archive(e));
        }
        Ok(())
    }
}
