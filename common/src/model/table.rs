//! Uploaded tables: a header row plus data rows, all cells as text.

use crate::error::{ReportError, Result};
use crate::model::csv::ColumnCheck;
use crate::model::datasource::TableDialect;
use crate::model::place_holder::PlaceholderType;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parses uploaded text. Blank lines are ignored and every cell is
    /// trimmed. Fails when no line is left.
    pub fn parse(text: &str, dialect: TableDialect) -> Result<Table> {
        let mut records = match dialect {
            TableDialect::Naive => parse_naive(text),
            TableDialect::Rfc4180 => parse_rfc4180(text)?,
        };
        if records.is_empty() {
            return Err(ReportError::Parse("the uploaded file has no rows".to_string()));
        }
        let headers = records.remove(0);
        Ok(Table {
            headers,
            rows: records,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows, i.e. recipients.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Index of the first header exactly equal to `column`.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == column)
    }

    /// Cell text, or an empty string when the row is shorter than the header.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Per-column summary inferred from the first data row.
    pub fn columns(&self) -> Vec<ColumnCheck> {
        let first = self.rows.first();
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, title)| {
                let sample = first.and_then(|row| row.get(idx)).cloned();
                ColumnCheck {
                    title: title.clone(),
                    placeholder_type: sample
                        .as_deref()
                        .map(PlaceholderType::infer)
                        .unwrap_or(PlaceholderType::Text),
                    first_row: sample,
                }
            })
            .collect()
    }
}

fn parse_naive(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(|cell| cell.trim().to_string()).collect())
        .collect()
}

fn parse_rfc4180(text: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}
