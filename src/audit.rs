//! CSV audit trail of mutating shell actions.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use log::debug;

use crate::core::Result;
use crate::error::VfsError;

const HEADER: [&str; 3] = ["Timestamp", "Command", "Details"];
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A successful mutating action, e.g. `cp` with detail `a.txt -> b.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    action: String,
    detail: String,
}

impl AuditEvent {
    pub fn new<A: Into<String>, D: Into<String>>(action: A, detail: D) -> AuditEvent {
        AuditEvent {
            action: action.into(),
            detail: detail.into(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Append-only CSV log with a `Timestamp,Command,Details` header.
///
/// The file is opened for each write and closed right after.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    /// Creates (or truncates) the log at `path` and writes the header row.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let log = Self {
            path: path.as_ref().to_path_buf(),
        };
        let init = || -> std::result::Result<(), csv::Error> {
            let mut writer = csv::Writer::from_path(&log.path)?;
            writer.write_record(HEADER)?;
            writer.flush()?;
            Ok(())
        };
        init().map_err(|e| log.failed(e))?;
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Appends one row for `event`, stamped with the local time.
    pub fn record(&self, event: &AuditEvent) -> Result<()> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
        let append = || -> std::result::Result<(), csv::Error> {
            let file = OpenOptions::new().append(true).open(&self.path)?;
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            writer.write_record([timestamp.as_str(), event.action(), event.detail()])?;
            writer.flush()?;
            Ok(())
        };
        append().map_err(|e| self.failed(e))?;
        debug!("audit: {} {}", event.action(), event.detail());
        Ok(())
    }

    fn failed(&self, source: csv::Error) -> VfsError {
        VfsError::AuditLog {
            path: self.path.clone(),
            source,
        }
    }
}
