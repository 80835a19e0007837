// crates/figures-core/src/columns.rs

use std::collections::HashSet;

use polars::prelude::DataFrame;

use crate::error::{PipelineError, Result};

pub const ID: &str = "ID";
pub const NAME: &str = "NAME";
pub const SHORT_DESCRIPTION: &str = "SHORT_DESCRIPTION";
pub const GENDER: &str = "GENDER";
pub const COUNTRY: &str = "COUNTRY";
pub const OCCUPATION: &str = "OCCUPATION";
pub const BIRTH_YEAR: &str = "BIRTH_YEAR";
pub const DEATH_YEAR: &str = "DEATH_YEAR";
pub const MANNER_OF_DEATH: &str = "MANNER_OF_DEATH";
pub const AGE_OF_DEATH: &str = "AGE_OF_DEATH";
pub const CALCULATED_AGE_OF_DEATH: &str = "CALCULATED_AGE_OF_DEATH";
pub const CENTURY_OF_BIRTH: &str = "CENTURY_OF_BIRTH";

/// Remote column order used by every generated INSERT.
pub const CANONICAL_COLUMNS: [&str; 12] = [
    ID,
    NAME,
    SHORT_DESCRIPTION,
    GENDER,
    COUNTRY,
    OCCUPATION,
    BIRTH_YEAR,
    DEATH_YEAR,
    MANNER_OF_DEATH,
    AGE_OF_DEATH,
    CALCULATED_AGE_OF_DEATH,
    CENTURY_OF_BIRTH,
];

/// Header names as they appear in the source file, before normalization.
pub mod source {
    pub const ID: &str = "ID";
    pub const BIRTH_YEAR: &str = "Birth year";
    pub const DEATH_YEAR: &str = "Death year";
    pub const AGE_OF_DEATH: &str = "Age of death";
    pub const CALCULATED_AGE_OF_DEATH: &str = "Calculated Age of Death";
    pub const CENTURY_OF_BIRTH: &str = "Century of Birth";
}

pub fn normalize_column_name(name: &str) -> String {
    name.to_uppercase().replace(' ', "_")
}

/// Returns a copy of `df` with every column name normalized.
pub fn normalize_column_names(df: &DataFrame) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| normalize_column_name(name.as_str()))
        .collect();

    let mut seen = HashSet::with_capacity(names.len());
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(PipelineError::Schema(format!(
                "more than one column normalizes to '{name}'"
            )));
        }
    }

    let mut renamed = df.clone();
    renamed.set_column_names(names)?;
    Ok(renamed)
}
