// crates/figures-core/src/report.rs

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::clean::CleanReport;
use crate::stats::{GroupMean, StatisticsReport, ValueCount};
use crate::sync::SyncReport;

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn number(value: Option<f64>) -> Cell {
    let text = value.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".to_string());
    Cell::new(text).set_alignment(CellAlignment::Right)
}

fn count(value: usize) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

pub fn render_clean_report(report: &CleanReport) -> String {
    let mut table = new_table(&["Step", "Rows"]);
    table.add_row(vec![Cell::new("rows read"), count(report.rows_in)]);
    table.add_row(vec![Cell::new("cells filled"), count(report.filled_cells)]);
    table.add_row(vec![Cell::new("dropped: missing ID"), count(report.dropped_missing_id)]);
    table.add_row(vec![
        Cell::new("dropped: missing values"),
        count(report.dropped_missing_values),
    ]);
    table.add_row(vec![Cell::new("dropped: exact duplicates"), count(report.exact_duplicates)]);
    table.add_row(vec![Cell::new("dropped: conflicting IDs"), count(report.conflicting_ids)]);
    table.add_row(vec![Cell::new("rows kept"), count(report.rows_out)]);
    table.to_string()
}

pub fn render_sync_report(report: &SyncReport) -> String {
    let mut table = new_table(&["Examined", "Inserted", "Skipped"]);
    table.add_row(vec![
        count(report.examined),
        count(report.inserted),
        count(report.skipped),
    ]);
    table.to_string()
}

fn value_count_table(title: &str, counts: &[ValueCount]) -> Table {
    let mut table = new_table(&[title, "Count"]);
    for entry in counts {
        table.add_row(vec![Cell::new(&entry.value), count(entry.count)]);
    }
    table
}

fn group_mean_table(title: &str, groups: &[GroupMean]) -> Table {
    let mut table = new_table(&[title, "Rows", "Mean age of death"]);
    for group in groups {
        table.add_row(vec![
            Cell::new(&group.group),
            count(group.count),
            number(group.mean),
        ]);
    }
    table
}

/// Renders every section of the statistics report as titled text tables.
pub fn render_statistics(report: &StatisticsReport) -> String {
    let mut sections: Vec<(String, Table)> = Vec::new();

    let mut missing = new_table(&["Column", "Missing"]);
    for entry in &report.overview.missing {
        missing.add_row(vec![Cell::new(&entry.column), count(entry.missing)]);
    }
    sections.push((
        format!(
            "Table: {} rows x {} columns",
            report.overview.rows,
            report.overview.columns.len()
        ),
        missing,
    ));

    let mut numeric = new_table(&[
        "Column", "Count", "Mean", "Std", "Min", "25%", "50%", "75%", "Max",
    ]);
    for summary in &report.numeric {
        numeric.add_row(vec![
            Cell::new(&summary.column),
            count(summary.count),
            number(summary.mean),
            number(summary.std),
            number(summary.min),
            number(summary.q25),
            number(summary.median),
            number(summary.q75),
            number(summary.max),
        ]);
    }
    sections.push(("Numeric columns".to_string(), numeric));

    let mut categorical = new_table(&["Column", "Count", "Unique", "Top", "Freq"]);
    for summary in &report.categorical {
        categorical.add_row(vec![
            Cell::new(&summary.column),
            count(summary.count),
            count(summary.unique),
            Cell::new(summary.top.as_deref().unwrap_or("-")),
            count(summary.freq),
        ]);
    }
    sections.push(("Categorical columns".to_string(), categorical));

    sections.push((
        "Gender distribution".to_string(),
        value_count_table("Gender", &report.gender_counts),
    ));
    sections.push((
        "Most common occupations".to_string(),
        value_count_table("Occupation", &report.top_occupations),
    ));
    sections.push((
        "Age of death by century of birth".to_string(),
        group_mean_table("Century", &report.mean_age_by_century),
    ));
    sections.push((
        "Age of death by gender".to_string(),
        group_mean_table("Gender", &report.mean_age_by_gender),
    ));

    let mut header = vec![""];
    header.extend(report.correlation.columns.iter().map(String::as_str));
    let mut correlation = new_table(&header);
    for (name, row) in report.correlation.columns.iter().zip(&report.correlation.values) {
        let mut cells = vec![Cell::new(name)];
        cells.extend(row.iter().map(|value| number(*value)));
        correlation.add_row(cells);
    }
    sections.push(("Correlation".to_string(), correlation));

    sections
        .into_iter()
        .map(|(title, table)| format!("{title}\n{table}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::summarize;
    use polars::prelude::*;

    #[test]
    fn statistics_render_every_section() {
        let frame = DataFrame::new(vec![
            Series::new("GENDER".into(), vec![Some("Male"), Some("Female")]).into(),
            Series::new("OCCUPATION".into(), vec![Some("Artist"), None]).into(),
            Series::new("AGE_OF_DEATH".into(), vec![Some(50.0f64), None]).into(),
            Series::new("CENTURY_OF_BIRTH".into(), vec![Some(19i32), Some(20)]).into(),
        ])
        .unwrap();

        let text = render_statistics(&summarize(&frame).unwrap());
        for title in [
            "Table: 2 rows x 4 columns",
            "Numeric columns",
            "Categorical columns",
            "Gender distribution",
            "Most common occupations",
            "Age of death by century of birth",
            "Age of death by gender",
            "Correlation",
        ] {
            assert!(text.contains(title), "missing section {title}");
        }
        assert!(text.contains("Artist"));
        assert!(text.contains("50.00"));
    }

    #[test]
    fn sync_report_lists_counts() {
        let text = render_sync_report(&SyncReport {
            examined: 3,
            inserted: 2,
            skipped: 1,
        });
        assert!(text.contains("Inserted"));
        assert!(text.contains('2'));
    }
}
