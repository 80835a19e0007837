// crates/figures-core/src/error.rs

use figures_parser::LoadError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Failed to load source table: {0}")]
    Load(#[from] LoadError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Table schema error: {0}")]
    Schema(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not reach the warehouse: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("Warehouse rejected statement `{statement}`: {source}")]
    Query {
        statement: String,
        #[source]
        source: sqlx::Error,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
