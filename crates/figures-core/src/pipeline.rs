// crates/figures-core/src/pipeline.rs

use std::path::Path;

use polars::prelude::DataFrame;
use tracing::info;

use crate::clean::{clean_table, CleanOptions, CleanReport};
use crate::columns::normalize_column_names;
use crate::error::Result;
use crate::record::{records_from_frame, Record};
use crate::transform::transform_table;

#[derive(Debug, Clone)]
pub struct PreparedTable {
    /// Cleaned, transformed frame with normalized column names.
    pub frame: DataFrame,
    pub clean_report: CleanReport,
}

impl PreparedTable {
    pub fn records(&self) -> Result<Vec<Record>> {
        records_from_frame(&self.frame)
    }
}

/// clean -> transform -> normalize, each stage producing a new frame.
pub fn prepare(raw: &DataFrame, options: &CleanOptions) -> Result<PreparedTable> {
    let cleaned = clean_table(raw, options)?;
    let transformed = transform_table(&cleaned.frame)?;
    let frame = normalize_column_names(&transformed)?;

    Ok(PreparedTable {
        frame,
        clean_report: cleaned.report,
    })
}

/// Loads the source file and prepares it.
pub fn load_and_prepare(path: &Path, options: &CleanOptions) -> Result<PreparedTable> {
    let raw = figures_parser::load_table(path)?;
    info!(
        path = %path.display(),
        rows = raw.height(),
        columns = raw.width(),
        "Loaded source table"
    );
    prepare(&raw, options)
}
