//! In-memory tables exchanged with the reshape engine.
//!
//! [`InputTable`] holds decoded text exactly as read (headers untrimmed, every
//! row as wide as the header). [`OutputTable`] holds typed cells under a fixed
//! column list.

use serde::Serialize;

use crate::data::{Cell, Value, display_cell};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl InputTable {
    /// Builds a table, padding short rows with empty fields and truncating long
    /// ones to the header width.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { headers, rows }
    }

    /// Convenience constructor for literal tables.
    pub fn from_rows<H, R, S>(headers: H, rows: R) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers = headers.into_iter().map(Into::into).collect();
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        Self::new(headers, rows)
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn field(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutputTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl OutputTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row; it is padded with nulls or cut to the column count.
    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), None);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Looks up a cell by row position and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    pub fn column_values(&self, column: &str) -> Option<Vec<&Cell>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Text rendering of the first `limit` rows, for previews.
    pub fn display_rows(&self, limit: Option<usize>, decimal: char) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|row| row.iter().map(|cell| display_cell(cell, decimal)).collect())
            .collect()
    }
}
