//! An in-memory row/column data source.
//!
//! [`Table`] classifies as [`Tabular`] and is written as
//! `{"Rows":[{"<column>":<cell>,...},...]}`. Any other type can take part in the same shape by
//! implementing [`Tabular`] itself.

use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use crate::error::{JsonError, Result};
use crate::reflect::{Float, Integer, Reflect, Tabular, Tag, ValueRef, Visit, VisitValue};

/// A single dynamically typed cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    /// Empty cell, written as `null`.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Integer(i64),
    /// Float.
    Float(f64),
    /// Text.
    Text(String),
    /// Identifier.
    Guid(Uuid),
    /// Timestamp.
    Date(DateTime<FixedOffset>),
}

impl Reflect for Cell {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(match self {
            Self::Null => ValueRef::Null,
            Self::Bool(v) => ValueRef::Bool(*v),
            Self::Integer(v) => ValueRef::Integer(Integer::Signed(i128::from(*v))),
            Self::Float(v) => ValueRef::Float(Float::F64(*v)),
            Self::Text(v) => ValueRef::String(v),
            Self::Guid(v) => ValueRef::Guid(*v),
            Self::Date(v) => ValueRef::Date(*v),
        })
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Uuid> for Cell {
    fn from(v: Uuid) -> Self {
        Self::Guid(v)
    }
}

impl From<DateTime<FixedOffset>> for Cell {
    fn from(v: DateTime<FixedOffset>) -> Self {
        Self::Date(v)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Named columns over rows of [`Cell`]s.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates an empty table with the given columns.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. The row must have one cell per column.
    pub fn push_row<I>(&mut self, cells: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Cell>,
    {
        let row: Vec<Cell> = cells.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(JsonError::invalid_operation(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Builder-style [`Table::push_row`].
    pub fn with_row<I>(mut self, cells: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Cell>,
    {
        self.push_row(cells)?;
        Ok(self)
    }

    /// The cell at `(row, column)`.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }
}

impl Tabular for Table {
    fn columns(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn with_cell(&self, row: usize, column: usize, f: &mut VisitValue<'_>) -> Result<()> {
        match self.cell(row, column) {
            Some(cell) => f(cell),
            None => f(&Cell::Null),
        }
    }
}

impl Reflect for Table {
    fn reflect(&self, visit: &mut Visit<'_>) -> Result<()> {
        visit(ValueRef::Tabular(self))
    }

    fn declared_tag() -> Option<Tag> {
        Some(Tag::Tabular)
    }
}
