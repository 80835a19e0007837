// crates/figures-core/src/stats.rs

use std::collections::{BTreeMap, HashMap};

use polars::prelude::*;
use serde::Serialize;

use crate::clean::ColumnMissing;
use crate::columns;
use crate::error::Result;

pub const TOP_OCCUPATIONS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct TableOverview {
    pub rows: usize,
    pub columns: Vec<String>,
    pub missing: Vec<ColumnMissing>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoricalSummary {
    pub column: String,
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub group: String,
    pub count: usize,
    pub mean: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatisticsReport {
    pub overview: TableOverview,
    pub numeric: Vec<NumericSummary>,
    pub categorical: Vec<CategoricalSummary>,
    pub gender_counts: Vec<ValueCount>,
    pub top_occupations: Vec<ValueCount>,
    pub mean_age_by_century: Vec<GroupMean>,
    pub mean_age_by_gender: Vec<GroupMean>,
    pub correlation: CorrelationMatrix,
}

/// Computes every statistic over a prepared frame. The frame is only read.
pub fn summarize(df: &DataFrame) -> Result<StatisticsReport> {
    let mut top_occupations = value_counts(df, columns::OCCUPATION)?;
    top_occupations.truncate(TOP_OCCUPATIONS);

    Ok(StatisticsReport {
        overview: overview(df),
        numeric: describe_numeric(df)?,
        categorical: describe_categorical(df)?,
        gender_counts: value_counts(df, columns::GENDER)?,
        top_occupations,
        mean_age_by_century: mean_age_by_century(df)?,
        mean_age_by_gender: mean_by_category(df, columns::GENDER, columns::AGE_OF_DEATH)?,
        correlation: correlation_matrix(df)?,
    })
}

pub fn overview(df: &DataFrame) -> TableOverview {
    TableOverview {
        rows: df.height(),
        columns: df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
        missing: df
            .get_columns()
            .iter()
            .map(|column| ColumnMissing {
                column: column.name().to_string(),
                missing: column.null_count(),
            })
            .collect(),
    }
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

fn numeric_values(column: &Column) -> Result<Vec<Option<f64>>> {
    let cast = column.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

pub fn describe_numeric(df: &DataFrame) -> Result<Vec<NumericSummary>> {
    let mut summaries = Vec::new();
    for column in df.get_columns() {
        if !is_numeric(column.dtype()) {
            continue;
        }
        let mut values: Vec<f64> = numeric_values(column)?.into_iter().flatten().collect();
        values.sort_by(|a, b| a.total_cmp(b));
        summaries.push(summarize_sorted(column.name().as_str(), &values));
    }
    Ok(summaries)
}

fn summarize_sorted(column: &str, sorted: &[f64]) -> NumericSummary {
    let count = sorted.len();
    let mean = mean(sorted);
    let std = match (mean, count) {
        (Some(mean), n) if n > 1 => {
            let sum_sq: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            Some((sum_sq / (n - 1) as f64).sqrt())
        }
        _ => None,
    };

    NumericSummary {
        column: column.to_string(),
        count,
        mean,
        std,
        min: sorted.first().copied(),
        q25: quantile(sorted, 0.25),
        median: quantile(sorted, 0.5),
        q75: quantile(sorted, 0.75),
        max: sorted.last().copied(),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Linear interpolation between closest ranks.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

pub fn describe_categorical(df: &DataFrame) -> Result<Vec<CategoricalSummary>> {
    let mut summaries = Vec::new();
    for column in df.get_columns() {
        if column.dtype() != &DataType::String {
            continue;
        }
        let counts = count_strings(column.str()?);
        let count: usize = counts.iter().map(|entry| entry.count).sum();
        let top = counts.first();
        summaries.push(CategoricalSummary {
            column: column.name().to_string(),
            count,
            unique: counts.len(),
            top: top.map(|entry| entry.value.clone()),
            freq: top.map(|entry| entry.count).unwrap_or(0),
        });
    }
    Ok(summaries)
}

/// Non-null values of `column` with their frequency, most frequent first.
pub fn value_counts(df: &DataFrame, column: &str) -> Result<Vec<ValueCount>> {
    let as_text = df.column(column)?.cast(&DataType::String)?;
    Ok(count_strings(as_text.str()?))
}

fn count_strings(values: &StringChunked) -> Vec<ValueCount> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.into_iter().flatten() {
        let entry = counts.entry(value).or_insert_with(|| {
            order.push(value);
            0
        });
        *entry += 1;
    }

    let mut result: Vec<ValueCount> = order
        .into_iter()
        .map(|value| ValueCount {
            value: value.to_string(),
            count: counts[value],
        })
        .collect();
    // Stable sort keeps first-seen order among ties.
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}

/// Mean age of death per century of birth, in century order.
pub fn mean_age_by_century(df: &DataFrame) -> Result<Vec<GroupMean>> {
    let centuries = df.column(columns::CENTURY_OF_BIRTH)?.cast(&DataType::Int64)?;
    let ages = numeric_values(df.column(columns::AGE_OF_DEATH)?)?;

    let mut groups: BTreeMap<i64, Accumulator> = BTreeMap::new();
    for (century, age) in centuries.i64()?.into_iter().zip(ages) {
        if let Some(century) = century {
            groups.entry(century).or_default().push(age);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(century, acc)| acc.finish(century.to_string()))
        .collect())
}

/// Mean of `value` per distinct non-null `group`, ordered by group name.
pub fn mean_by_category(df: &DataFrame, group: &str, value: &str) -> Result<Vec<GroupMean>> {
    let keys = df.column(group)?.cast(&DataType::String)?;
    let values = numeric_values(df.column(value)?)?;

    let mut groups: BTreeMap<&str, Accumulator> = BTreeMap::new();
    for (key, value) in keys.str()?.into_iter().zip(values) {
        if let Some(key) = key {
            groups.entry(key).or_default().push(value);
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, acc)| acc.finish(key.to_string()))
        .collect())
}

#[derive(Default)]
struct Accumulator {
    rows: usize,
    sum: f64,
    observed: usize,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        self.rows += 1;
        if let Some(value) = value {
            self.sum += value;
            self.observed += 1;
        }
    }

    fn finish(self, group: String) -> GroupMean {
        GroupMean {
            group,
            count: self.rows,
            mean: (self.observed > 0).then(|| self.sum / self.observed as f64),
        }
    }
}

/// Pearson correlation between every pair of numeric columns, using the rows
/// where both values are present.
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    let mut names = Vec::new();
    let mut data = Vec::new();
    for column in df.get_columns() {
        if is_numeric(column.dtype()) {
            names.push(column.name().to_string());
            data.push(numeric_values(column)?);
        }
    }

    let values = data
        .iter()
        .map(|left| data.iter().map(|right| pearson(left, right)).collect())
        .collect();

    Ok(CorrelationMatrix {
        columns: names,
        values,
    })
}

fn pearson(left: &[Option<f64>], right: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = left
        .iter()
        .zip(right)
        .filter_map(|(l, r)| Some(((*l)?, (*r)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_l = pairs.iter().map(|(l, _)| l).sum::<f64>() / n;
    let mean_r = pairs.iter().map(|(_, r)| r).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_l = 0.0;
    let mut var_r = 0.0;
    for (l, r) in &pairs {
        cov += (l - mean_l) * (r - mean_r);
        var_l += (l - mean_l).powi(2);
        var_r += (r - mean_r).powi(2);
    }

    if var_l == 0.0 || var_r == 0.0 {
        return None;
    }
    Some(cov / (var_l.sqrt() * var_r.sqrt()))
}
