// crates/figures-core/src/sql.rs

use std::fmt;

use crate::columns::{self, CANONICAL_COLUMNS};
use crate::error::{PipelineError, Result};
use crate::record::{Record, Year};

pub const DEFAULT_TABLE: &str = "historical_figures";

/// A typed statement parameter. Nulls keep their type so they can be bound.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Integer(Option<i64>),
    Float(Option<f64>),
}

impl SqlValue {
    pub fn text(value: Option<&str>) -> Self {
        SqlValue::Text(value.map(str::to_string))
    }

    /// Free-text fields lose their commas before they reach the warehouse.
    pub fn free_text(value: Option<&str>) -> Self {
        SqlValue::Text(value.map(strip_commas))
    }

    pub fn year(value: Option<Year>) -> Self {
        SqlValue::Integer(value.map(|year| i64::from(year.value())))
    }

    pub fn integer(value: Option<i32>) -> Self {
        SqlValue::Integer(value.map(i64::from))
    }

    pub fn float(value: Option<f64>) -> Self {
        SqlValue::Float(value.filter(|value| value.is_finite()))
    }

    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Text(value) => value.is_none(),
            SqlValue::Integer(value) => value.is_none(),
            SqlValue::Float(value) => value.is_none(),
        }
    }

    /// Renders the value as a SQL literal: `NULL`, a quoted string, or a bare number.
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Text(Some(text)) => quote_literal(text),
            SqlValue::Integer(Some(value)) => value.to_string(),
            SqlValue::Float(Some(value)) => value.to_string(),
            _ => "NULL".to_string(),
        }
    }
}

pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

pub fn strip_commas(text: &str) -> String {
    text.replace(',', "")
}

/// A validated table reference, optionally schema-qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
    pub fn new(name: &str) -> Result<Self> {
        let valid = !name.is_empty()
            && name.split('.').count() <= 2
            && name.split('.').all(is_identifier);
        if valid {
            Ok(TableName(name.to_string()))
        } else {
            Err(PipelineError::Config(format!(
                "'{name}' is not a plain SQL table name"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        TableName(DEFAULT_TABLE.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_identifier(part: &str) -> bool {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// SQL text with `$n` placeholders and the parameters they refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlValue>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Splices every parameter into the text as an escaped literal.
    ///
    /// Only the template is scanned for placeholders, so a literal that happens to
    /// contain `$1` is never substituted again.
    pub fn render_inline(&self) -> String {
        let mut rendered = String::with_capacity(self.sql.len() + 16 * self.params.len());
        let mut chars = self.sql.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '$' {
                rendered.push(c);
                continue;
            }

            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }

            let param = digits
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| self.params.get(index));
            match param {
                Some(value) => rendered.push_str(&value.to_literal()),
                None => {
                    rendered.push('$');
                    rendered.push_str(&digits);
                }
            }
        }

        rendered
    }
}

/// `SELECT COUNT(*) FROM <table> WHERE ID = $1`
pub fn existence_query(table: &TableName, id: &str) -> Statement {
    Statement::new(
        format!("SELECT COUNT(*) FROM {table} WHERE {} = $1", columns::ID),
        vec![SqlValue::text(Some(id))],
    )
}

/// `INSERT` covering all twelve columns in canonical order.
pub fn insert_statement(table: &TableName, record: &Record) -> Statement {
    let placeholders: Vec<String> = (1..=CANONICAL_COLUMNS.len())
        .map(|n| format!("${n}"))
        .collect();
    let sql = format!(
        "INSERT INTO {table} ({}) VALUES ({})",
        CANONICAL_COLUMNS.join(", "),
        placeholders.join(", ")
    );
    Statement::new(sql, record_values(record))
}

fn record_values(record: &Record) -> Vec<SqlValue> {
    vec![
        SqlValue::text(Some(record.id.as_str())),
        SqlValue::text(record.name.as_deref()),
        SqlValue::free_text(record.short_description.as_deref()),
        SqlValue::text(record.gender.as_deref()),
        SqlValue::free_text(record.country.as_deref()),
        SqlValue::free_text(record.occupation.as_deref()),
        SqlValue::year(record.birth_year),
        SqlValue::year(record.death_year),
        SqlValue::text(record.manner_of_death.as_deref()),
        SqlValue::float(record.age_of_death),
        SqlValue::integer(record.calculated_age_of_death),
        SqlValue::integer(record.century_of_birth),
    ]
}
