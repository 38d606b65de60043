//! Data-quality reports over any frame.

use crate::{MergedDataset, Result};
use polars::prelude::*;
use serde::Serialize;

/// Missing values in one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingColumn {
    /// Column name
    pub column: String,
    /// Number of null values
    pub total: usize,
    /// Share of null values, in percent
    pub percent: f64,
    /// Column data type
    pub dtype: String,
}

/// Cardinality of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnCardinality {
    /// Column name
    pub column: String,
    /// Number of non-null values
    pub total: usize,
    /// Number of distinct non-null values
    pub uniques: usize,
}

/// Null count, null percentage and dtype per column, in column order.
///
/// An empty frame reports 0% for every column.
pub fn missing_data(frame: &DataFrame) -> Vec<MissingColumn> {
    let height = frame.height();
    frame
        .get_columns()
        .iter()
        .map(|column| {
            let total = column.null_count();
            let percent = if height == 0 {
                0.0
            } else {
                total as f64 / height as f64 * 100.0
            };
            MissingColumn {
                column: column.name().to_string(),
                total,
                percent,
                dtype: column.dtype().to_string(),
            }
        })
        .collect()
}

/// Non-null count and distinct non-null count per column, in column order.
pub fn unique_values(frame: &DataFrame) -> Result<Vec<ColumnCardinality>> {
    frame
        .get_columns()
        .iter()
        .map(|column| {
            let nulls = column.null_count();
            let distinct = column.as_materialized_series().n_unique()?;
            Ok(ColumnCardinality {
                column: column.name().to_string(),
                total: column.len() - nulls,
                uniques: if nulls > 0 { distinct - 1 } else { distinct },
            })
        })
        .collect()
}

impl MergedDataset {
    /// [`missing_data`] over the dataset.
    pub fn missing_data(&self) -> Vec<MissingColumn> {
        missing_data(self.frame())
    }

    /// [`unique_values`] over the dataset.
    pub fn unique_values(&self) -> Result<Vec<ColumnCardinality>> {
        unique_values(self.frame())
    }
}
