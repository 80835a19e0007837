// crates/figures-core/src/transform.rs

use polars::prelude::*;
use tracing::info;

use crate::columns::source;
use crate::error::{PipelineError, Result};
use crate::record::{calculated_age, Year};

/// Parses the year and age columns and appends the derived columns.
///
/// Unparsable years and ages become nulls rather than errors. Years are stored as
/// `Int32` year numbers; `Calculated Age of Death` and `Century of Birth` are appended
/// at the end of the frame.
pub fn transform_table(df: &DataFrame) -> Result<DataFrame> {
    let birth = parse_years(df, source::BIRTH_YEAR)?;
    let death = parse_years(df, source::DEATH_YEAR)?;
    let age = parse_numbers(df, source::AGE_OF_DEATH)?;

    let calculated: Vec<Option<i32>> = birth
        .iter()
        .zip(death.iter())
        .map(|(birth, death)| calculated_age(*birth, *death))
        .collect();
    let century: Vec<Option<i32>> = birth
        .iter()
        .map(|birth| birth.map(Year::century))
        .collect();

    let unparsed = birth.iter().filter(|year| year.is_none()).count();

    let mut columns: Vec<Column> = df.get_columns().to_vec();
    replace_column(&mut columns, df, source::BIRTH_YEAR, year_series(source::BIRTH_YEAR, &birth))?;
    replace_column(&mut columns, df, source::DEATH_YEAR, year_series(source::DEATH_YEAR, &death))?;
    replace_column(&mut columns, df, source::AGE_OF_DEATH, Series::new(source::AGE_OF_DEATH.into(), age))?;
    columns.push(Series::new(source::CALCULATED_AGE_OF_DEATH.into(), calculated).into());
    columns.push(Series::new(source::CENTURY_OF_BIRTH.into(), century).into());

    let transformed = DataFrame::new(columns)?;
    info!(
        rows = transformed.height(),
        birth_years_absent = unparsed,
        "Transformed year and age columns"
    );
    Ok(transformed)
}

fn parse_years(df: &DataFrame, name: &str) -> Result<Vec<Option<Year>>> {
    let values = df.column(name)?.str()?;
    Ok(values
        .into_iter()
        .map(|cell| cell.and_then(Year::parse))
        .collect())
}

fn parse_numbers(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let values = df.column(name)?.str()?;
    Ok(values
        .into_iter()
        .map(|cell| {
            cell.and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|value| value.is_finite())
        })
        .collect())
}

fn year_series(name: &str, years: &[Option<Year>]) -> Series {
    let values: Vec<Option<i32>> = years.iter().map(|year| year.map(Year::value)).collect();
    Series::new(name.into(), values)
}

fn replace_column(
    columns: &mut [Column],
    df: &DataFrame,
    name: &str,
    series: Series,
) -> Result<()> {
    let index = df
        .get_column_index(name)
        .ok_or_else(|| PipelineError::Schema(format!("missing {name} column")))?;
    columns[index] = series.into();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_frame(rows: &[(&str, Option<&str>, Option<&str>, Option<&str>)]) -> DataFrame {
        DataFrame::new(vec![
            Series::new("ID".into(), rows.iter().map(|r| r.0).collect::<Vec<_>>()).into(),
            Series::new("Birth year".into(), rows.iter().map(|r| r.1).collect::<Vec<_>>()).into(),
            Series::new("Death year".into(), rows.iter().map(|r| r.2).collect::<Vec<_>>()).into(),
            Series::new("Age of death".into(), rows.iter().map(|r| r.3).collect::<Vec<_>>()).into(),
        ])
        .unwrap()
    }

    #[test]
    fn derives_age_and_century() {
        let df = source_frame(&[
            ("Q42", Some("1952"), Some("2001"), Some("49.0")),
            ("Q1", Some("1985"), None, None),
            ("Q2", Some("2000"), Some("2001"), Some("1")),
            ("Q3", Some("-384"), Some("-322"), Some("62.0")),
            ("Q4", Some("unknown"), Some("1900"), Some("n/a years")),
        ]);

        let out = transform_table(&df).unwrap();

        let calculated = out.column("Calculated Age of Death").unwrap().i32().unwrap();
        assert_eq!(calculated.get(0), Some(49));
        assert_eq!(calculated.get(1), None);
        assert_eq!(calculated.get(2), Some(1));
        assert_eq!(calculated.get(3), None);
        assert_eq!(calculated.get(4), None);

        let century = out.column("Century of Birth").unwrap().i32().unwrap();
        assert_eq!(century.get(0), Some(20));
        assert_eq!(century.get(1), Some(20));
        assert_eq!(century.get(2), Some(20));
        assert_eq!(century.get(3), None);

        let birth = out.column("Birth year").unwrap().i32().unwrap();
        assert_eq!(birth.get(0), Some(1952));
        assert_eq!(birth.get(3), None);

        let age = out.column("Age of death").unwrap().f64().unwrap();
        assert_eq!(age.get(0), Some(49.0));
        assert_eq!(age.get(1), None);
        assert_eq!(age.get(4), None);
    }

    #[test]
    fn keeps_column_positions_and_appends_derived() {
        let df = source_frame(&[("Q42", Some("1952"), Some("2001"), Some("49"))]);
        let out = transform_table(&df).unwrap();

        let names: Vec<String> = out
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "ID",
                "Birth year",
                "Death year",
                "Age of death",
                "Calculated Age of Death",
                "Century of Birth",
            ]
        );
        assert_eq!(df.width(), 4, "input frame must not be modified");
    }

    #[test]
    fn missing_year_column_is_an_error() {
        let df = DataFrame::new(vec![Series::new("ID".into(), vec!["Q1"]).into()]).unwrap();
        assert!(transform_table(&df).is_err());
    }
}
