//! In-memory table that flows through the cleaning stages.
//!
//! Every column carries the type tag declared when the dataset was built.
//! Stages may append columns or drop whole rows; they never remove or reorder
//! existing columns.

use crate::{
    data::Value,
    error::{PipelineError, Result},
    schema::{ColumnMeta, ColumnType, Schema},
};

pub type Row = Vec<Option<Value>>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<ColumnMeta>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Builds a dataset from declared columns and rows. Rows shorter than the
    /// column list are padded with missing cells.
    pub fn new(columns: Vec<ColumnMeta>, rows: Vec<Row>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                debug_assert!(row.len() <= width, "row wider than declared columns");
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn schema(&self) -> Schema {
        Schema::new(self.columns.clone())
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::MissingColumn(name.to_string()))
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    /// Appends a column, one value per row. Re-deriving an existing column
    /// overwrites its cells in place so column order is never disturbed.
    pub fn push_column(
        &mut self,
        name: &str,
        data_type: ColumnType,
        values: Vec<Option<Value>>,
    ) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                self.columns[idx].data_type = data_type;
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(ColumnMeta::new(name, data_type));
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Keeps only rows for which `keep` returns true, preserving order.
    pub fn retain_rows<F>(&mut self, keep: F)
    where
        F: FnMut(&Row) -> bool,
    {
        self.rows.retain(keep);
    }

    pub fn into_parts(self) -> (Vec<ColumnMeta>, Vec<Row>) {
        (self.columns, self.rows)
    }
}
