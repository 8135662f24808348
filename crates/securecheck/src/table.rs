//! Tabular result sets.
//!
//! A [`Table`] is what every store call returns: the column names reported by
//! the statement and the materialised rows. It knows how to count values in a
//! column and how to print itself as an aligned text table, CSV or JSON.

use std::collections::BTreeMap;
use std::fmt;

use rusqlite::types::ValueRef;
use serde::Serialize;

use crate::error::Result;

/// One cell of a result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL `NULL`.
    Null,
    /// An integer cell.
    Integer(i64),
    /// A floating point cell.
    Real(f64),
    /// A text cell.
    Text(String),
}

impl Value {
    /// The text content if this is a text cell.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The integer content if this is an integer cell.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Whether this is SQL `NULL`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    // storage class rank; NULL has none
    fn kind(&self) -> Option<u8> {
        match self {
            Self::Null => None,
            Self::Integer(_) => Some(0),
            Self::Real(_) => Some(1),
            Self::Text(_) => Some(2),
        }
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Self::Null,
            ValueRef::Integer(n) => Self::Integer(n),
            ValueRef::Real(f) => Self::Real(f),
            ValueRef::Text(bytes) => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => Self::Text(format!("<{} bytes>", bytes.len())),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Real(x) => write!(f, "{x}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A materialised result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// A table with no columns and no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from column names and rows.
    ///
    /// Rows shorter than the header are padded with `NULL`, longer rows are
    /// truncated.
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Column names in statement order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All rows.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the named column.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Whether the table has the named column.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over the cells of one column, `None` if the column is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[index]))
    }

    /// Frequency of each non-null value in a column.
    ///
    /// Cells of different types count separately even when they print the
    /// same, so `1` and `'1'` are two entries. Ordered by count descending,
    /// then by value ascending. `None` if the column is absent.
    #[must_use]
    pub fn value_counts(&self, name: &str) -> Option<Vec<(String, usize)>> {
        let mut counts: BTreeMap<(String, u8), usize> = BTreeMap::new();
        for value in self.column(name)? {
            if let Some(kind) = value.kind() {
                *counts.entry((value.to_string(), kind)).or_default() += 1;
            }
        }

        let mut counts: Vec<(String, usize)> = counts
            .into_iter()
            .map(|((value, _), count)| (value, count))
            .collect();
        // stable: ties stay in value order
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        Some(counts)
    }

    /// Distinct non-null values of a column in first-seen order.
    #[must_use]
    pub fn distinct(&self, name: &str) -> Vec<String> {
        let mut seen = Vec::new();
        if let Some(values) = self.column(name) {
            for value in values.filter(|v| !v.is_null()) {
                let value = value.to_string();
                if !seen.contains(&value) {
                    seen.push(value);
                }
            }
        }
        seen
    }

    /// Keep only the rows for which `keep` returns true.
    #[must_use]
    pub fn filter<F>(&self, keep: F) -> Self
    where
        F: Fn(&[Value]) -> bool,
    {
        Self {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .filter(|row| keep(row))
                .cloned()
                .collect(),
        }
    }

    /// The first `limit` rows.
    #[must_use]
    pub fn head(&self, limit: usize) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(limit).cloned().collect(),
        }
    }

    /// Render as an aligned plain-text table.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        let cells: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        for row in &cells {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_line(&mut out, self.columns.iter().map(String::as_str), &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        push_line(&mut out, rule.iter().map(String::as_str), &widths);
        for row in &cells {
            push_line(&mut out, row.iter().map(String::as_str), &widths);
        }
        out
    }

    /// Render as CSV with a header line.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV writer fails.
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(ToString::to_string))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| crate::Error::internal(format!("flushing CSV output: {e}")))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Render as pretty JSON: `{"columns": [...], "rows": [[...], ...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            vec!["violation".to_string(), "driver_age".to_string()],
            vec![
                vec![Value::from("Speeding"), Value::from(27)],
                vec![Value::from("DUI"), Value::from(40)],
                vec![Value::from("Speeding"), Value::from(19)],
                vec![Value::Null, Value::from(55)],
                vec![Value::from("Seatbelt"), Value::from(33)],
            ],
        )
    }

    #[test]
    fn test_empty_table() {
        let table = Table::empty();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
        assert!(table.value_counts("violation").is_none());
        assert!(!table.has_column("violation"));
    }

    #[test]
    fn test_has_column() {
        let table = sample();
        assert!(table.has_column("violation"));
        assert!(!table.has_column("Violation"));
    }

    #[test]
    fn test_new_pads_short_rows() {
        let table = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Value::from(1)]],
        );
        assert_eq!(table.rows()[0], vec![Value::Integer(1), Value::Null]);
    }

    #[test]
    fn test_value_counts_orders_by_count_then_value() {
        let counts = sample().value_counts("violation").unwrap();
        assert_eq!(
            counts,
            vec![
                ("Speeding".to_string(), 2),
                ("DUI".to_string(), 1),
                ("Seatbelt".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_value_counts_keeps_types_apart() {
        let table = Table::new(
            vec!["stop_outcome".to_string()],
            vec![
                vec![Value::Integer(1)],
                vec![Value::from("1")],
                vec![Value::from("Warning")],
                vec![Value::from("Warning")],
                vec![Value::Null],
            ],
        );

        assert_eq!(
            table.value_counts("stop_outcome").unwrap(),
            vec![
                ("Warning".to_string(), 2),
                ("1".to_string(), 1),
                ("1".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_value_counts_missing_column() {
        assert!(sample().value_counts("driver_race").is_none());
    }

    #[test]
    fn test_distinct_skips_nulls_and_keeps_first_seen_order() {
        assert_eq!(
            sample().distinct("violation"),
            vec!["Speeding", "DUI", "Seatbelt"]
        );
        assert!(sample().distinct("nope").is_empty());
    }

    #[test]
    fn test_filter_and_head() {
        let table = sample();
        let adults = table.filter(|row| row[1].as_integer().is_some_and(|age| age >= 30));
        assert_eq!(adults.len(), 3);
        assert_eq!(adults.columns(), table.columns());
        assert_eq!(table.head(2).len(), 2);
        assert_eq!(table.head(100).len(), 5);
    }

    #[test]
    fn test_render_text_aligns_columns() {
        let text = sample().head(2).render_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "violation  driver_age");
        assert_eq!(lines[1], "---------  ----------");
        assert_eq!(lines[2], "Speeding   27");
        assert_eq!(lines[3], "DUI        40");
    }

    #[test]
    fn test_to_csv() {
        let csv = sample().head(2).to_csv().unwrap();
        assert_eq!(csv, "violation,driver_age\nSpeeding,27\nDUI,40\n");
    }

    #[test]
    fn test_to_json_keeps_column_order() {
        let json = sample().head(1).to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["columns"][0], "violation");
        assert_eq!(parsed["rows"][0][1], 27);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Real(12.5).to_string(), "12.5");
        assert_eq!(Value::from("x").as_text(), Some("x"));
        assert_eq!(Value::from(3).as_integer(), Some(3));
        assert_eq!(Value::Real(3.0).as_integer(), None);
    }
}
