//! Error taxonomy for the cleaning pipeline.
//!
//! A dataset whose schema does not match is *not* an error: it is reported as
//! [`crate::pipeline::FileOutcome::Skipped`]. Everything here either aborts the
//! current file (I/O, parsing) or the whole run ([`PipelineError::is_fatal`]).

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::Schema;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Input {path:?} not found or not readable: {source}")]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?} row {row} column '{column}': {message}")]
    Parse {
        path: PathBuf,
        row: usize,
        column: String,
        message: String,
    },

    #[error("Column '{0}' is not present in the dataset")]
    MissingColumn(String),

    #[error("Cause table {path:?} does not match expected schema {expected}; found {actual}")]
    CauseSchemaMismatch {
        path: PathBuf,
        expected: Schema,
        actual: Schema,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PipelineError {
    /// Errors that must stop the whole run rather than just the current file.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PipelineError::CauseSchemaMismatch { .. }
                | PipelineError::Config(_)
                | PipelineError::MissingColumn(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
