use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("header row is empty")]
    EmptyHeader,

    #[error("required column '{column}' is missing from the header")]
    MissingColumn { column: &'static str },

    #[error("failed to build table: {source}")]
    Frame {
        #[source]
        source: PolarsError,
    },
}

impl From<csv::Error> for LoadError {
    fn from(source: csv::Error) -> Self {
        LoadError::Csv { source }
    }
}

impl From<PolarsError> for LoadError {
    fn from(source: PolarsError) -> Self {
        LoadError::Frame { source }
    }
}
