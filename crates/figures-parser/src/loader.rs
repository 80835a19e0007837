use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use polars::prelude::*;

use crate::errors::LoadError;
use crate::schema::{MISSING_TOKENS, SOURCE_COLUMNS};

/// Reads the whole file at `path` into a frame of nullable string columns.
pub fn load_table(path: impl AsRef<Path>) -> Result<DataFrame, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_table(BufReader::new(file))
}

pub fn parse_table(content: &str) -> Result<DataFrame, LoadError> {
    read_table(content.as_bytes())
}

/// Decodes rectangular CSV from `reader`. Every column keeps its header name and
/// is loaded as `String`; blank cells and missing-value tokens become nulls.
pub fn read_table<R: Read>(reader: R) -> Result<DataFrame, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|header| header.is_empty()) {
        return Err(LoadError::EmptyHeader);
    }

    for column in SOURCE_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(LoadError::MissingColumn { column });
        }
    }

    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        for (column, cell) in values.iter_mut().zip(record.iter()) {
            column.push(clean_cell(cell));
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(headers.len());
    for (header, data) in headers.iter().zip(values.iter()) {
        let utf8: Vec<Option<&str>> = data.iter().map(|v| v.as_deref()).collect();
        columns.push(Series::new(header.as_str().into(), utf8).into());
    }

    Ok(DataFrame::new(columns)?)
}

pub fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    MISSING_TOKENS.iter().any(|token| *token == trimmed)
}

fn clean_cell(cell: &str) -> Option<String> {
    if is_missing(cell) {
        None
    } else {
        Some(cell.to_string())
    }
}
