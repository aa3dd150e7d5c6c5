use std::path::PathBuf;

use thiserror::Error;

use crate::data::time_label::TimeFormatError;

/// Everything that can abort a load. Construction is all-or-nothing: no
/// variant is ever paired with a partially built dataset.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Zero or several files in the data directory match the source pattern.
    #[error("expected exactly one file matching '{pattern}' in {}, found {count}", .dir.display())]
    FileResolution {
        dir: PathBuf,
        pattern: String,
        count: usize,
        candidates: Vec<PathBuf>,
    },

    /// No candidate encoding could decode the file.
    #[error("could not decode {} with any of {attempted:?}", .path.display())]
    Decode {
        path: PathBuf,
        attempted: Vec<&'static str>,
    },

    #[error(transparent)]
    TimeFormat(#[from] TimeFormatError),

    /// The text decoded cleanly but is not well-formed delimited data.
    #[error("malformed CSV in {} (decoded as {encoding})", .path.display())]
    Csv {
        path: PathBuf,
        encoding: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("required columns missing: {missing:?}")]
    MissingColumns { missing: Vec<&'static str> },

    #[error("no time-slot columns found after the identifying columns")]
    NoTimeColumns,

    #[error("identifying columns repeated across rows: {key}")]
    DuplicateEntity { key: String },

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
