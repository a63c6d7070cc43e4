// Append-only audit log of successful seals.
//
// One CSV row per seal: `<timestamp>,<retrievalId>,<filename>`.
// The file is opened in append mode for every record and closed again
// right after, so earlier rows are never rewritten and a row is on disk
// by the time `record` returns. Single writer only; there is no locking.

use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::error::SealError;

/// Default log file, in the working directory.
pub const DEFAULT_LOG_PATH: &str = "seallog.csv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealLogEntry {
    pub timestamp: DateTime<Utc>,
    pub retrieval_id: String,
    pub filename: String,
}

impl SealLogEntry {
    pub fn now(retrieval_id: impl Into<String>, filename: impl Into<String>) -> Self {
        SealLogEntry {
            timestamp: Utc::now(),
            retrieval_id: retrieval_id.into(),
            filename: filename.into(),
        }
    }

    /// Row fields in log order. The timestamp is RFC 3339 UTC with
    /// millisecond precision.
    pub fn fields(&self) -> [String; 3] {
        [
            self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.retrieval_id.clone(),
            self.filename.clone(),
        ]
    }
}

#[derive(Debug, Clone)]
pub struct SealLog {
    path: PathBuf,
}

impl SealLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SealLog { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entry`, creating the log if needed.
    pub fn record(&self, entry: &SealLogEntry) -> Result<(), SealError> {
        append_record(&self.path, &entry.fields()).map_err(|e| SealError::io(&self.path, e))?;
        tracing::debug!(
            path = %self.path.display(),
            retrieval_id = %entry.retrieval_id,
            "appended seal log entry"
        );
        Ok(())
    }

    /// Read every row back as raw fields. A log that does not exist yet
    /// has no rows.
    pub fn entries(&self) -> Result<Vec<Vec<String>>, SealError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SealError::io(&self.path, e)),
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(file);
        reader
            .records()
            .map(|row| {
                row.map(|r| r.iter().map(String::from).collect())
                    .map_err(|e| SealError::io(&self.path, e.into()))
            })
            .collect()
    }
}

#[cfg(unix)]
fn open_append(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

fn append_record(path: &Path, fields: &[String]) -> io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(open_append(path)?);
    writer.write_record(fields)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_data()
}
