//! Tabular record set: ordered column names plus row objects

use serde_json::{Map, Value};
use std::collections::HashSet;
use tensor_interop_common::{ConversionError, Result};

/// One row of a [`DataFrame`], keyed by column name
pub type Row = Map<String, Value>;

/// Ordered rows of named fields with a fixed, unique column order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFrame {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl DataFrame {
    /// Build a frame from row objects and an explicit column order
    ///
    /// # Errors
    /// Returns [`ConversionError::DuplicateColumn`] if a column name repeats.
    pub fn new(rows: Vec<Row>, columns: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ConversionError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self { columns, rows })
    }

    /// Build a frame whose columns are every key seen, in first-seen order
    #[must_use]
    pub fn from_records(rows: Vec<Row>) -> Self {
        let mut seen = HashSet::new();
        let mut columns = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if seen.insert(key.clone()) {
                    columns.push(key.clone());
                }
            }
        }
        Self { columns, rows }
    }

    /// Parse a JSON array of row objects
    pub fn from_json(json: &str) -> Result<Self> {
        let rows: Vec<Row> = serde_json::from_str(json)?;
        Ok(Self::from_records(rows))
    }

    /// Row objects restricted to this frame's columns, in column order
    #[must_use]
    pub fn to_records(&self) -> Vec<Row> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .filter_map(|c| row.get(c).map(|v| (c.clone(), v.clone())))
                    .collect()
            })
            .collect()
    }

    /// Serialize as a JSON array of row objects
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_records())?)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(row_count, column_count)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}
