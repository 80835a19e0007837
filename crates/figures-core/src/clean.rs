// crates/figures-core/src/clean.rs

use std::collections::{BTreeMap, HashSet};

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::columns;
use crate::error::{PipelineError, Result};

/// Which columns cause a row to be dropped when they hold a missing value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "DropPolicyRepr")]
pub enum DropPolicy {
    #[default]
    None,
    All,
    Columns(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DropPolicyRepr {
    Keyword(String),
    Columns(Vec<String>),
}

impl TryFrom<DropPolicyRepr> for DropPolicy {
    type Error = String;

    fn try_from(repr: DropPolicyRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            DropPolicyRepr::Keyword(keyword) => match keyword.as_str() {
                "none" => Ok(DropPolicy::None),
                "all" => Ok(DropPolicy::All),
                other => Err(format!(
                    "drop_missing must be \"none\", \"all\" or a list of columns, got \"{other}\""
                )),
            },
            DropPolicyRepr::Columns(columns) => Ok(DropPolicy::Columns(columns)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CleanOptions {
    /// Column name to the value that replaces its missing cells.
    pub fill: BTreeMap<String, String>,
    pub drop_missing: DropPolicy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColumnMissing {
    pub column: String,
    pub missing: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    pub rows_in: usize,
    pub rows_out: usize,
    pub missing_before: Vec<ColumnMissing>,
    pub filled_cells: usize,
    pub dropped_missing_id: usize,
    pub dropped_missing_values: usize,
    pub exact_duplicates: usize,
    pub conflicting_ids: usize,
}

#[derive(Debug, Clone)]
pub struct CleanedTable {
    pub frame: DataFrame,
    pub report: CleanReport,
}

/// Fills and drops missing values, then removes duplicate rows.
///
/// Expects the string table produced by the loader. Rows without an `ID` are always
/// dropped. Of several identical rows the first survives; a later row reusing an
/// earlier `ID` with different contents is dropped as a conflict.
pub fn clean_table(df: &DataFrame, options: &CleanOptions) -> Result<CleanedTable> {
    let rows_in = df.height();
    let missing_before: Vec<ColumnMissing> = df
        .get_columns()
        .iter()
        .map(|column| ColumnMissing {
            column: column.name().to_string(),
            missing: column.null_count(),
        })
        .collect();

    let (filled, filled_cells) = apply_fills(df, &options.fill)?;
    let drop_columns = resolve_drop_columns(&filled, &options.drop_missing)?;

    let all_columns: Vec<&StringChunked> = filled
        .get_columns()
        .iter()
        .map(|column| column.str())
        .collect::<PolarsResult<_>>()?;
    let id_index = filled
        .get_column_index(columns::source::ID)
        .ok_or_else(|| PipelineError::Schema(format!("missing {} column", columns::source::ID)))?;
    let ids = all_columns[id_index];
    let drop_checks: Vec<&StringChunked> = drop_columns
        .iter()
        .map(|&index| all_columns[index])
        .collect();

    let mut keep = vec![false; rows_in];
    let mut seen_rows: HashSet<Vec<Option<&str>>> = HashSet::new();
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut conflicting: Vec<&str> = Vec::new();
    let mut dropped_missing_id = 0;
    let mut dropped_missing_values = 0;
    let mut exact_duplicates = 0;

    for (idx, keep_row) in keep.iter_mut().enumerate() {
        let Some(id) = ids.get(idx).filter(|id| !id.trim().is_empty()) else {
            dropped_missing_id += 1;
            continue;
        };

        if drop_checks.iter().any(|column| column.get(idx).is_none()) {
            dropped_missing_values += 1;
            continue;
        }

        let row: Vec<Option<&str>> = all_columns.iter().map(|column| column.get(idx)).collect();
        if !seen_rows.insert(row) {
            exact_duplicates += 1;
            continue;
        }

        if !seen_ids.insert(id) {
            conflicting.push(id);
            continue;
        }

        *keep_row = true;
    }

    if !conflicting.is_empty() {
        warn!(
            count = conflicting.len(),
            ids = ?conflicting,
            "Dropped rows whose ID was already taken by an earlier row"
        );
    }

    let mask = Series::new("keep".into(), keep);
    let frame = filled.filter(mask.bool()?)?;

    let report = CleanReport {
        rows_in,
        rows_out: frame.height(),
        missing_before,
        filled_cells,
        dropped_missing_id,
        dropped_missing_values,
        exact_duplicates,
        conflicting_ids: conflicting.len(),
    };

    info!(
        rows_in = report.rows_in,
        rows_out = report.rows_out,
        filled_cells = report.filled_cells,
        exact_duplicates = report.exact_duplicates,
        "Cleaned source table"
    );

    Ok(CleanedTable { frame, report })
}

fn apply_fills(df: &DataFrame, fill: &BTreeMap<String, String>) -> Result<(DataFrame, usize)> {
    let mut columns: Vec<Column> = df.get_columns().to_vec();
    let mut filled_cells = 0;

    for (name, value) in fill {
        let Some(index) = df.get_column_index(name) else {
            warn!(column = %name, "Fill value configured for a column that does not exist");
            continue;
        };

        let values = columns[index].str()?;
        filled_cells += values.null_count();
        let replaced: Vec<Option<&str>> = values
            .into_iter()
            .map(|cell| cell.or(Some(value.as_str())))
            .collect();
        let series = Series::new(name.as_str().into(), replaced);
        columns[index] = series.into();
    }

    Ok((DataFrame::new(columns)?, filled_cells))
}

fn resolve_drop_columns(df: &DataFrame, policy: &DropPolicy) -> Result<Vec<usize>> {
    match policy {
        DropPolicy::None => Ok(Vec::new()),
        DropPolicy::All => Ok((0..df.width()).collect()),
        DropPolicy::Columns(names) => names
            .iter()
            .map(|name| {
                df.get_column_index(name).ok_or_else(|| {
                    PipelineError::Schema(format!("cannot drop on unknown column '{name}'"))
                })
            })
            .collect(),
    }
}
