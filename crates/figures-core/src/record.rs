// crates/figures-core/src/record.rs

use std::fmt;

use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::Serialize;

use crate::columns;
use crate::error::{PipelineError, Result};

/// A calendar year held at year precision (January 1st).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(NaiveDate);

impl Year {
    pub fn new(year: i32) -> Option<Self> {
        if !(0..=9999).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year, 1, 1).map(Year)
    }

    /// Accepts exactly four digits, optionally with a `.0` suffix left behind by
    /// float formatting. Anything else is treated as absent.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<i32>().ok().and_then(Year::new)
    }

    pub fn value(self) -> i32 {
        self.0.year()
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    pub fn century(self) -> i32 {
        self.value().div_euclid(100) + 1
    }
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.value())
    }
}

impl Serialize for Year {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.value())
    }
}

pub fn calculated_age(birth: Option<Year>, death: Option<Year>) -> Option<i32> {
    match (birth, death) {
        (Some(birth), Some(death)) => Some(death.value() - birth.value()),
        _ => None,
    }
}

/// One prepared historical figure, ready to be handed to the synchronizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: String,
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub occupation: Option<String>,
    pub birth_year: Option<Year>,
    pub death_year: Option<Year>,
    pub manner_of_death: Option<String>,
    pub age_of_death: Option<f64>,
    pub calculated_age_of_death: Option<i32>,
    pub century_of_birth: Option<i32>,
}

impl Record {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            short_description: None,
            gender: None,
            country: None,
            occupation: None,
            birth_year: None,
            death_year: None,
            manner_of_death: None,
            age_of_death: None,
            calculated_age_of_death: None,
            century_of_birth: None,
        }
    }

    /// Sets both years and recomputes the derived fields from them.
    pub fn with_years(mut self, birth: Option<Year>, death: Option<Year>) -> Self {
        self.birth_year = birth;
        self.death_year = death;
        self.calculated_age_of_death = calculated_age(birth, death);
        self.century_of_birth = birth.map(Year::century);
        self
    }
}

/// Materializes a prepared (normalized) frame into records, in row order.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<Record>> {
    let id = string_column(df, columns::ID)?;
    let name = string_column(df, columns::NAME)?;
    let short_description = string_column(df, columns::SHORT_DESCRIPTION)?;
    let gender = string_column(df, columns::GENDER)?;
    let country = string_column(df, columns::COUNTRY)?;
    let occupation = string_column(df, columns::OCCUPATION)?;
    let birth_year = i32_column(df, columns::BIRTH_YEAR)?;
    let death_year = i32_column(df, columns::DEATH_YEAR)?;
    let manner_of_death = string_column(df, columns::MANNER_OF_DEATH)?;
    let age_of_death = f64_column(df, columns::AGE_OF_DEATH)?;
    let calculated = i32_column(df, columns::CALCULATED_AGE_OF_DEATH)?;
    let century = i32_column(df, columns::CENTURY_OF_BIRTH)?;

    let owned = |value: Option<&str>| value.map(str::to_string);

    let mut records = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let record_id = id
            .get(idx)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| PipelineError::Schema(format!("row {idx} has no ID")))?;

        records.push(Record {
            id: record_id.to_string(),
            name: owned(name.get(idx)),
            short_description: owned(short_description.get(idx)),
            gender: owned(gender.get(idx)),
            country: owned(country.get(idx)),
            occupation: owned(occupation.get(idx)),
            birth_year: birth_year.get(idx).and_then(Year::new),
            death_year: death_year.get(idx).and_then(Year::new),
            manner_of_death: owned(manner_of_death.get(idx)),
            age_of_death: age_of_death.get(idx),
            calculated_age_of_death: calculated.get(idx),
            century_of_birth: century.get(idx),
        });
    }

    Ok(records)
}

fn string_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    df.column(name)
        .and_then(|column| column.str())
        .map_err(|err| PipelineError::Schema(format!("column {name}: {err}")))
}

fn i32_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Int32Chunked> {
    df.column(name)
        .and_then(|column| column.i32())
        .map_err(|err| PipelineError::Schema(format!("column {name}: {err}")))
}

fn f64_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Float64Chunked> {
    df.column(name)
        .and_then(|column| column.f64())
        .map_err(|err| PipelineError::Schema(format!("column {name}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_parsing_is_permissive() {
        assert_eq!(Year::parse("1985").map(Year::value), Some(1985));
        assert_eq!(Year::parse(" 1985 ").map(Year::value), Some(1985));
        assert_eq!(Year::parse("1985.0").map(Year::value), Some(1985));
        assert_eq!(Year::parse("0999").map(Year::value), Some(999));
        assert_eq!(Year::parse("-384"), None);
        assert_eq!(Year::parse("985"), None);
        assert_eq!(Year::parse("19850"), None);
        assert_eq!(Year::parse("1985.5"), None);
        assert_eq!(Year::parse("abcd"), None);
        assert_eq!(Year::parse(""), None);
    }

    #[test]
    fn year_is_january_first() {
        let year = Year::new(1952).unwrap();
        assert_eq!(year.date(), NaiveDate::from_ymd_opt(1952, 1, 1).unwrap());
        assert_eq!(year.to_string(), "1952");
        assert_eq!(Year::new(999).unwrap().to_string(), "0999");
    }

    #[test]
    fn century_boundaries() {
        assert_eq!(Year::new(1985).unwrap().century(), 20);
        assert_eq!(Year::new(2000).unwrap().century(), 20);
        assert_eq!(Year::new(2001).unwrap().century(), 21);
        assert_eq!(Year::new(1899).unwrap().century(), 19);
    }

    #[test]
    fn derived_fields_need_both_years() {
        let both = Record::new("Q1").with_years(Year::new(1952), Year::new(2001));
        assert_eq!(both.calculated_age_of_death, Some(49));
        assert_eq!(both.century_of_birth, Some(20));

        let birth_only = Record::new("Q2").with_years(Year::new(1952), None);
        assert_eq!(birth_only.calculated_age_of_death, None);
        assert_eq!(birth_only.century_of_birth, Some(20));

        let death_only = Record::new("Q3").with_years(None, Year::new(2001));
        assert_eq!(death_only.calculated_age_of_death, None);
        assert_eq!(death_only.century_of_birth, None);
    }

    #[test]
    fn frame_without_canonical_columns_is_a_schema_error() {
        let df = DataFrame::new(vec![Series::new("ID".into(), vec!["Q1"]).into()]).unwrap();
        let err = records_from_frame(&df).unwrap_err();
        assert!(matches!(err, PipelineError::Schema(_)));
    }
}
