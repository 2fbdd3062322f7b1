use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use zip::ZipArchive;

use crate::error::Error;
use crate::logger::Logger;

/// Unpacks zip archives onto the filesystem.
///
/// Entries are processed in central-directory order with an asymmetric
/// per-entry failure policy: an entry that cannot be opened, or whose
/// destination file cannot be created, is logged and skipped; a failure
/// while copying an entry's bytes aborts the whole extraction.
///
/// Archives are treated as trusted input: stored entry names are used
/// as-is, with no path sanitization.
pub struct Extractor {
    log: Arc<Logger>,
}

impl Extractor {
    pub fn new(log: Arc<Logger>) -> Self {
        Self { log }
    }

    /// Extract `archive_path` under `target_dir`.
    ///
    /// File entries are written to `target_dir` joined with their stored
    /// path, creating missing parent directories on demand. Directory
    /// entries, however, are created from their stored path as-is, relative
    /// to the process working directory rather than `target_dir`; the two
    /// kinds only land together when extracting into the working directory.
    /// The divergence is deliberate and pinned by tests. A directory entry
    /// that cannot be created is fatal.
    ///
    /// # Errors
    ///
    /// [`Error::Open`] if the archive cannot be opened, [`Error::Archive`]
    /// if its central directory cannot be read, [`Error::Create`] if a
    /// directory entry cannot be materialized, and [`Error::Copy`] if an
    /// entry's byte copy fails. Per-entry open and destination-file
    /// creation failures are logged and skipped, never returned.
    pub fn extract<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        archive_path: P,
        target_dir: Q,
    ) -> Result<(), Error> {
        self.extract_impl(archive_path.as_ref(), target_dir.as_ref())
    }

    /// Extract `archive_path` into the current working directory.
    pub fn extract_to_current_dir<P: AsRef<Path>>(&self, archive_path: P) -> Result<(), Error> {
        self.extract_impl(archive_path.as_ref(), Path::new("."))
    }

    /// Extract `archive_path` into the current working directory, then
    /// delete the archive file.
    ///
    /// The archive is removed only after a fully successful extraction; on
    /// failure it is left in place and the failure is returned unchanged. A
    /// removal failure surfaces as [`Error::Remove`], with the extracted
    /// files still on disk.
    pub fn extract_to_current_dir_and_delete<P: AsRef<Path>>(
        &self,
        archive_path: P,
    ) -> Result<(), Error> {
        let archive_path = archive_path.as_ref();
        if let Err(e) = self.extract_impl(archive_path, Path::new(".")) {
            self.log.error(
                "extraction failed",
                [
                    ("archive", archive_path.display().to_string()),
                    ("error", e.to_string()),
                ],
            );
            return Err(e);
        }
        if let Err(e) = fs::remove_file(archive_path) {
            self.log.error(
                "failed to remove archive",
                [
                    ("archive", archive_path.display().to_string()),
                    ("error", e.to_string()),
                ],
            );
            return Err(Error::Remove(e));
        }
        Ok(())
    }

    fn extract_impl(&self, archive_path: &Path, target_dir: &Path) -> Result<(), Error> {
        let file = match File::open(archive_path) {
            Ok(f) => f,
            Err(e) => {
                self.log.error(
                    "failed to open archive",
                    [
                        ("archive", archive_path.display().to_string()),
                        ("error", e.to_string()),
                    ],
                );
                return Err(Error::Open(e));
            }
        };
        let mut archive = match ZipArchive::new(BufReader::new(file)) {
            Ok(a) => a,
            Err(e) => {
                self.log.error(
                    "failed to read archive",
                    [
                        ("archive", archive_path.display().to_string()),
                        ("error", e.to_string()),
                    ],
                );
                return Err(Error::Archive(e));
            }
        };

        for i in 0..archive.len() {
            let mut entry = match archive.by_index(i) {
                Ok(entry) => entry,
                Err(e) => {
                    // The name is unavailable once the open has failed, so
                    // the record carries the index instead.
                    self.log.error(
                        "failed to open archive entry",
                        [("index", i.to_string()), ("error", e.to_string())],
                    );
                    continue;
                }
            };
            let name = entry.name().to_string();

            if entry.is_dir() {
                // Stored name as-is: directory entries land relative to the
                // working directory, not under target_dir.
                if let Err(e) = fs::create_dir_all(&name) {
                    self.log.error(
                        "failed to create directory",
                        [("entry", name), ("error", e.to_string())],
                    );
                    return Err(Error::Create(e));
                }
                continue;
            }

            let dest = target_dir.join(&name);
            if let Some(parent) = dest.parent() {
                // Best effort; a miss shows up as the create failure below.
                let _ = fs::create_dir_all(parent);
            }
            let mut out = match File::create(&dest) {
                Ok(f) => f,
                Err(e) => {
                    self.log.error(
                        "failed to create output file",
                        [
                            ("path", dest.display().to_string()),
                            ("error", e.to_string()),
                        ],
                    );
                    continue;
                }
            };
            if let Err(e) = io::copy(&mut entry, &mut out) {
                self.log.error(
                    "failed to copy entry contents",
                    [("entry", name), ("error", e.to_string())],
                );
                return Err(Error::Copy(e));
            }
        }
        Ok(())
    }
}
