// crates/figures-core/src/export.rs

use std::io::Write;

use crate::columns::CANONICAL_COLUMNS;
use crate::error::Result;
use crate::record::Record;

/// Writes records as CSV under the twelve canonical column names.
/// Absent values are written as empty cells.
pub fn write_csv<W: Write>(records: &[Record], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CANONICAL_COLUMNS)?;

    for record in records {
        writer.write_record([
            record.id.clone(),
            opt(&record.name),
            opt(&record.short_description),
            opt(&record.gender),
            opt(&record.country),
            opt(&record.occupation),
            record.birth_year.map(|year| year.to_string()).unwrap_or_default(),
            record.death_year.map(|year| year.to_string()).unwrap_or_default(),
            opt(&record.manner_of_death),
            record.age_of_death.map(|age| age.to_string()).unwrap_or_default(),
            record
                .calculated_age_of_death
                .map(|age| age.to_string())
                .unwrap_or_default(),
            record
                .century_of_birth
                .map(|century| century.to_string())
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Year;

    #[test]
    fn writes_header_and_rows() {
        let mut record = Record::new("Q42").with_years(Year::new(1952), Year::new(2001));
        record.name = Some("Douglas Adams".into());
        record.short_description = Some("writer, humorist".into());
        record.age_of_death = Some(49.0);

        let mut buffer = Vec::new();
        write_csv(&[record], &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CANONICAL_COLUMNS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("Q42,Douglas Adams,\"writer, humorist\",,,,1952,2001,,49,49,20")
        );
        assert_eq!(lines.next(), None);
    }
}
