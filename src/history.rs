//! Rolling history index of per-run logs.
//!
//! The index is a markdown file whose entry lines start with `- [`; any other line
//! (the title, blank lines, hand-written notes) is ignored when reading.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::{ReportError, Result};

pub const HISTORY_MARKER: &str = "- [";
pub const HISTORY_HEADER: &str = "History:\n---";
pub const MAX_HISTORY_ENTRIES: usize = 25;

/// Relative link target for log files inside the index.
pub const LOG_LINK_DIR: &str = "./logs";

#[derive(Debug, Error)]
pub enum HistoryReadError {
    #[error("history file {} does not exist", .0.display())]
    Missing(PathBuf),
    #[error("history file {} is malformed: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },
    #[error("cannot read history file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Entry lines of an index, in file order.
pub fn parse_history(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter(|line| line.starts_with(HISTORY_MARKER))
        .map(str::to_string)
        .collect()
}

pub fn history_entry(date: &str, log_file: &str) -> String {
    format!("{HISTORY_MARKER}{date}]({LOG_LINK_DIR}/{log_file})")
}

pub fn render_history(entries: &[String]) -> String {
    let mut md = String::from(HISTORY_HEADER);
    md.push('\n');
    for entry in entries {
        md.push_str(entry);
        md.push('\n');
    }
    md
}

#[derive(Debug, Clone)]
pub struct HistoryTracker {
    path: PathBuf,
    limit: usize,
}

impl HistoryTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            limit: MAX_HISTORY_ENTRIES,
        }
    }

    /// Caps the index at `limit` entries; values below 1 are raised to 1.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn read(&self) -> std::result::Result<Vec<String>, HistoryReadError> {
        let bytes = fs::read(&self.path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => HistoryReadError::Missing(self.path.clone()),
            _ => HistoryReadError::Io {
                path: self.path.clone(),
                source,
            },
        })?;
        let contents = String::from_utf8(bytes).map_err(|e| HistoryReadError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        Ok(parse_history(&contents))
    }

    /// Like [`read`](Self::read), but a missing or malformed file is an empty history.
    pub fn read_or_empty(&self) -> std::result::Result<Vec<String>, HistoryReadError> {
        match self.read() {
            Ok(entries) => Ok(entries),
            Err(HistoryReadError::Missing(_)) => {
                tracing::debug!(path = %self.path.display(), "no history yet");
                Ok(Vec::new())
            }
            Err(err @ HistoryReadError::Malformed { .. }) => {
                tracing::warn!(error = %err, "discarding unreadable history");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Puts a link to `log_file` at the head of the index and rewrites the file.
    ///
    /// Returns the entries as written, most recent first.
    pub fn record(&self, date: &str, log_file: &str) -> Result<Vec<String>> {
        let mut entries = self.read_or_empty()?;

        let keep = self.limit - 1;
        if entries.len() > keep {
            tracing::debug!(
                dropped = entries.len() - keep,
                limit = self.limit,
                "trimming history"
            );
            entries.truncate(keep);
        }
        entries.insert(0, history_entry(date, log_file));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ReportError::io(parent, e))?;
        }
        fs::write(&self.path, render_history(&entries))
            .map_err(|e| ReportError::io(&self.path, e))?;
        Ok(entries)
    }
}
