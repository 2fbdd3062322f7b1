//! End-to-end tests that depend on the process working directory.
//!
//! Directory entries extract relative to the working directory, and the
//! *_current_dir operations write there directly, so every test in this
//! binary funnels through one lock and runs inside a scratch directory.

use std::env;
use std::fs;
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::tempdir;
use zip::write::FileOptions;
use zipdir::{Archiver, Config, Error, Extractor, Logger};

static CWD_LOCK: Mutex<()> = Mutex::new(());

/// Run `f` with the working directory moved to `dir`, restoring the previous
/// one when `f` returns or panics.
fn with_cwd<T>(dir: &Path, f: impl FnOnce() -> T) -> T {
    struct Restore(PathBuf);

    impl Drop for Restore {
        fn drop(&mut self) {
            let _ = env::set_current_dir(&self.0);
        }
    }

    let _guard = CWD_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    // Drops before the lock guard, so the directory is restored while the
    // lock is still held.
    let _restore = Restore(env::current_dir().unwrap());
    env::set_current_dir(dir).unwrap();
    f()
}

/// Logger writing inside the scratch directory so tests leave no trace.
fn test_logger(dir: &Path) -> Arc<Logger> {
    Arc::new(Logger::new(&Config {
        debug: false,
        log_file_path: Some(dir.join("test.log")),
    }))
}

#[test]
fn test_round_trip_recreates_tree() {
    let tmp = tempdir().unwrap();
    with_cwd(tmp.path(), || {
        fs::create_dir_all("src/sub").unwrap();
        fs::write("src/a.txt", "hello").unwrap();
        fs::write("src/sub/b.txt", "world").unwrap();
        fs::write("src/empty.txt", "").unwrap();

        let log = test_logger(tmp.path());
        Archiver::new(log.clone()).archive("src", "out.zip").unwrap();
        Extractor::new(log).extract("out.zip", "dst").unwrap();

        assert_eq!(fs::read_to_string("dst/a.txt").unwrap(), "hello");
        assert_eq!(fs::read_to_string("dst/sub/b.txt").unwrap(), "world");
        assert_eq!(fs::read("dst/empty.txt").unwrap().len(), 0);
    });
}

#[test]
fn test_directory_entries_resolve_against_current_dir() {
    let tmp = tempdir().unwrap();
    with_cwd(tmp.path(), || {
        fs::create_dir_all("src/sub").unwrap();
        fs::create_dir_all("src/emptydir").unwrap();
        fs::write("src/sub/b.txt", "world").unwrap();

        let log = test_logger(tmp.path());
        Archiver::new(log.clone()).archive("src", "out.zip").unwrap();
        Extractor::new(log).extract("out.zip", "dst").unwrap();

        // File entries land under the target; their parents are created on
        // demand there.
        assert_eq!(fs::read_to_string("dst/sub/b.txt").unwrap(), "world");

        // Directory entries use the stored name as-is: they materialize in
        // the working directory, and an empty directory shows up only there.
        assert!(Path::new("sub").is_dir());
        assert!(Path::new("emptydir").is_dir());
        assert!(!Path::new("dst/emptydir").exists());
    });
}

#[test]
fn test_uncreatable_directory_entry_aborts_extraction() {
    let tmp = tempdir().unwrap();
    with_cwd(tmp.path(), || {
        // Hand-built archive: a directory entry first, then a file entry
        // behind it.
        let file = fs::File::create("in.zip").unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options: FileOptions<()> = FileOptions::default();
        zip.add_directory("blocked", options.clone()).unwrap();
        zip.start_file("after.txt", options).unwrap();
        zip.write_all(b"cut off").unwrap();
        zip.finish().unwrap();

        // A plain file squatting on the stored name makes the directory
        // creation fail in the working directory.
        fs::write("blocked", "in the way").unwrap();

        let extractor = Extractor::new(test_logger(tmp.path()));
        let result = extractor.extract("in.zip", "dst");

        // A file entry that cannot be created is skipped; a directory entry
        // that cannot be created ends the run before later entries.
        assert!(matches!(result, Err(Error::Create(_))));
        assert!(!Path::new("dst/after.txt").exists());
        assert_eq!(fs::read_to_string("blocked").unwrap(), "in the way");
    });
}

#[test]
fn test_extract_to_current_dir() {
    let tmp = tempdir().unwrap();
    let work = tmp.path().join("work");
    let out = tmp.path().join("unpack");
    fs::create_dir_all(&work).unwrap();
    fs::create_dir_all(&out).unwrap();
    let archive = tmp.path().join("out.zip");

    with_cwd(&work, || {
        fs::create_dir_all("src/sub").unwrap();
        fs::write("src/a.txt", "hello").unwrap();
        fs::write("src/sub/b.txt", "world").unwrap();
        Archiver::new(test_logger(tmp.path()))
            .archive("src", &archive)
            .unwrap();
    });

    with_cwd(&out, || {
        Extractor::new(test_logger(tmp.path()))
            .extract_to_current_dir(&archive)
            .unwrap();
    });

    assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(out.join("sub/b.txt")).unwrap(), "world");
}

#[test]
fn test_extract_to_current_dir_and_delete_removes_archive() {
    let tmp = tempdir().unwrap();
    with_cwd(tmp.path(), || {
        fs::create_dir_all("src").unwrap();
        fs::write("src/a.txt", "hello").unwrap();

        let log = test_logger(tmp.path());
        Archiver::new(log.clone()).archive("src", "out.zip").unwrap();
        Extractor::new(log)
            .extract_to_current_dir_and_delete("out.zip")
            .unwrap();

        assert_eq!(fs::read_to_string("a.txt").unwrap(), "hello");
        assert!(!Path::new("out.zip").exists());
    });
}

#[test]
fn test_delete_variant_keeps_archive_on_failure() {
    let tmp = tempdir().unwrap();
    with_cwd(tmp.path(), || {
        fs::write("bad.zip", "junk, not an archive").unwrap();

        let extractor = Extractor::new(test_logger(tmp.path()));
        let result = extractor.extract_to_current_dir_and_delete("bad.zip");

        assert!(matches!(result, Err(Error::Archive(_))));
        assert!(Path::new("bad.zip").exists());
    });
}

#[test]
fn test_convenience_functions_round_trip() {
    let tmp = tempdir().unwrap();
    with_cwd(tmp.path(), || {
        fs::create_dir_all("src/sub").unwrap();
        fs::write("src/a.txt", "hello").unwrap();
        fs::write("src/sub/b.txt", "world").unwrap();

        zipdir::archive_dir("src", "out.zip").unwrap();
        zipdir::extract_file("out.zip", "dst").unwrap();

        assert_eq!(fs::read_to_string("dst/a.txt").unwrap(), "hello");
        assert_eq!(fs::read_to_string("dst/sub/b.txt").unwrap(), "world");
        // The default-config logger opens its file relative to the working
        // directory as soon as it is built.
        assert!(Path::new("logs/zipdir.log").exists());
    });
}

#[test]
fn test_working_directory_restored_after_panic() {
    let tmp = tempdir().unwrap();
    let doomed = tmp.path().join("doomed");
    fs::create_dir_all(&doomed).unwrap();

    let result = panic::catch_unwind(|| with_cwd(&doomed, || panic!("boom")));
    assert!(result.is_err());

    // Without the restore the process would still sit in the deleted
    // directory and the next with_cwd would fail to read it.
    fs::remove_dir(&doomed).unwrap();
    with_cwd(tmp.path(), || {
        assert!(env::current_dir().is_ok());
    });
}
