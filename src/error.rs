use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::history::HistoryReadError;

pub type Result<T> = std::result::Result<T, ReportError>;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot parse run file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid run: {0}")]
    InvalidRun(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("chart error: {0}")]
    Chart(String),
    #[error(transparent)]
    History(#[from] HistoryReadError),
}

impl ReportError {
    pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_run<T: Into<String>>(msg: T) -> Self {
        ReportError::InvalidRun(msg.into())
    }

    pub fn invalid_config<T: Into<String>>(msg: T) -> Self {
        ReportError::InvalidConfig(msg.into())
    }

    pub fn chart<T: Into<String>>(msg: T) -> Self {
        ReportError::Chart(msg.into())
    }
}
