use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

use crate::config::Config;

/// Log file used when [`Config::log_file_path`] is unset.
pub const DEFAULT_LOG_PATH: &str = "logs/zipdir.log";

/// Structured error logger shared by [`Archiver`](crate::Archiver) and
/// [`Extractor`](crate::Extractor).
///
/// Each record is appended to the log file as one JSON object per line,
/// carrying a unix-seconds timestamp, the level, a message, and whatever
/// contextual fields the call site attached. Logging is fire-and-forget: a
/// file that cannot be opened leaves the logger inert, and write failures
/// never surface into operation results.
pub struct Logger {
    debug: bool,
    sink: Option<Mutex<File>>,
}

impl Logger {
    /// Open the log file named by `config` in append mode, creating missing
    /// parent directories. Construction cannot fail; an unopenable file
    /// disables the sink.
    pub fn new(config: &Config) -> Self {
        let path = config
            .log_file_path
            .as_deref()
            .unwrap_or(Path::new(DEFAULT_LOG_PATH));
        Self {
            debug: config.debug,
            sink: open_sink(path).map(Mutex::new),
        }
    }

    /// Append one error record with the given contextual fields.
    pub fn error<'a, I>(&self, message: &str, fields: I)
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let mut record = Map::new();
        record.insert("ts".into(), Value::from(now_secs()));
        record.insert("level".into(), Value::from("error"));
        record.insert("message".into(), Value::from(message));
        for (key, value) in fields {
            record.insert(key.into(), Value::from(value));
        }
        let line = Value::Object(record).to_string();

        if self.debug {
            eprintln!("{}", line);
        }
        if let Some(sink) = &self.sink {
            if let Ok(mut file) = sink.lock() {
                let _ = writeln!(file, "{}", line);
            }
        }
    }
}

fn open_sink(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let _ = fs::create_dir_all(parent);
        }
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
