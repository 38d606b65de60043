//! Providers of the three base relations.
//!
//! The analysis core never talks to storage directly. A [`RelationSource`]
//! hands out one [`DataFrame`] per named relation, either from frames already
//! in memory or from an SQLite snapshot with `financials`, `observations` and
//! `company` tables.

use crate::{AnalysisError, Result};
use polars::prelude::*;
use rusqlite::{Connection, OpenFlags, OptionalExtension, types::Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// A provider of named tabular relations.
pub trait RelationSource: std::fmt::Debug {
    /// Fetch a relation by name.
    ///
    /// Fails with [`AnalysisError::DataUnavailable`] when the relation does not exist.
    fn relation(&self, name: &str) -> Result<DataFrame>;
}

/// Relations held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    relations: HashMap<String, DataFrame>,
}

impl InMemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a relation.
    pub fn with_relation(mut self, name: impl Into<String>, frame: DataFrame) -> Self {
        self.relations.insert(name.into(), frame);
        self
    }
}

impl RelationSource for InMemorySource {
    fn relation(&self, name: &str) -> Result<DataFrame> {
        self.relations
            .get(name)
            .cloned()
            .ok_or_else(|| AnalysisError::unavailable(name, "relation not registered"))
    }
}

/// Relations read from an SQLite database file.
#[derive(Debug)]
pub struct SqliteSource {
    conn: Connection,
}

impl SqliteSource {
    /// Open an existing database read-only.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AnalysisError::unavailable(
                path.display().to_string(),
                "database file not found",
            ));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    /// Wrap an already open connection.
    pub const fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    fn has_table(&self, name: &str) -> Result<bool> {
        let found: Option<String> = self
            .conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl RelationSource for SqliteSource {
    fn relation(&self, name: &str) -> Result<DataFrame> {
        if !self.has_table(name)? {
            return Err(AnalysisError::unavailable(name, "table not found in database"));
        }

        let sql = format!("SELECT * FROM \"{}\"", name.replace('"', "\"\""));
        let mut stmt = self.conn.prepare(&sql)?;
        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let mut cells: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            for (idx, values) in cells.iter_mut().enumerate() {
                values.push(row.get::<_, Value>(idx)?);
            }
        }

        let columns = names
            .iter()
            .zip(cells)
            .map(|(name, values)| sqlite_column(name, values))
            .collect();
        let frame = DataFrame::new(columns)?;

        debug!(relation = name, rows = frame.height(), columns = frame.width(), "loaded relation");
        Ok(frame)
    }
}

/// Build a typed column from dynamically typed SQLite cells.
///
/// SQLite columns carry no enforced type, so the narrowest type that holds
/// every non-null cell wins: integers, then floats, then text.
fn sqlite_column(name: &str, values: Vec<Value>) -> Column {
    let has_text = values
        .iter()
        .any(|v| matches!(v, Value::Text(_) | Value::Blob(_)));
    let has_real = values.iter().any(|v| matches!(v, Value::Real(_)));

    if has_text {
        let text: Vec<Option<String>> = values
            .into_iter()
            .map(|v| match v {
                Value::Text(s) => Some(s),
                Value::Integer(i) => Some(i.to_string()),
                Value::Real(f) => Some(f.to_string()),
                Value::Null | Value::Blob(_) => None,
            })
            .collect();
        Column::new(name.into(), text)
    } else if has_real {
        let reals: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| match v {
                Value::Real(f) => Some(f),
                Value::Integer(i) => Some(i as f64),
                _ => None,
            })
            .collect();
        Column::new(name.into(), reals)
    } else {
        let ints: Vec<Option<i64>> = values
            .into_iter()
            .map(|v| match v {
                Value::Integer(i) => Some(i),
                _ => None,
            })
            .collect();
        Column::new(name.into(), ints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> SqliteSource {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE financials (cvr INTEGER, year INTEGER, profit_loss REAL, publication_date TEXT);
             INSERT INTO financials VALUES (1001, 2020, 10.5, '2021-03-01');
             INSERT INTO financials VALUES (1001, 2021, 7, '2022/03/01');
             INSERT INTO financials VALUES (1002, 2021, NULL, NULL);",
        )
        .unwrap();
        SqliteSource::from_connection(conn)
    }

    #[test]
    fn test_sqlite_relation_types() {
        let frame = fixture().relation("financials").unwrap();

        assert_eq!(frame.shape(), (3, 4));
        assert_eq!(frame.column("cvr").unwrap().dtype(), &DataType::Int64);
        assert_eq!(frame.column("profit_loss").unwrap().dtype(), &DataType::Float64);
        assert_eq!(frame.column("publication_date").unwrap().dtype(), &DataType::String);

        let profit = frame.column("profit_loss").unwrap().f64().unwrap();
        assert_eq!(profit.get(1), Some(7.0));
        assert_eq!(profit.get(2), None);
    }

    #[test]
    fn test_sqlite_missing_table() {
        let err = fixture().relation("company").unwrap_err();
        assert!(matches!(err, AnalysisError::DataUnavailable { .. }));
    }

    #[test]
    fn test_sqlite_missing_file() {
        let err = SqliteSource::open("/nonexistent/cvr.db").unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_in_memory_source() {
        let frame = df!["cvr" => ["1"]].unwrap();
        let source = InMemorySource::new().with_relation("financials", frame);

        assert_eq!(source.relation("financials").unwrap().height(), 1);
        assert!(matches!(
            source.relation("observations"),
            Err(AnalysisError::DataUnavailable { .. })
        ));
    }
}
