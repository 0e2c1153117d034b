//! The flat, one-row-per-unit output table and its CSV form.
//!
//! Columns are the union of every row's columns, in first-seen order. A
//! row without a column writes an empty cell.

use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use itertools::Itertools;

use crate::error::{ErrorKind, IResult};
use crate::game_data::write_atomically;

/// A single output value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Written `|`-joined.
    List(Vec<String>),
}

impl Cell {
    pub fn text<S: Into<String>>(value: Option<S>) -> Cell {
        value.map(|v| Cell::Text(v.into())).unwrap_or(Cell::Empty)
    }

    pub fn float(value: Option<f64>) -> Cell {
        value
            .filter(|v| v.is_finite())
            .map(Cell::Float)
            .unwrap_or(Cell::Empty)
    }

    pub fn int(value: Option<i64>) -> Cell {
        value.map(Cell::Int).unwrap_or(Cell::Empty)
    }

    /// A number when `value` parses as one, otherwise the text itself.
    pub fn number_or_text(value: Option<&str>) -> Cell {
        match value {
            None => Cell::Empty,
            Some(v) => match v.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => Cell::Float(n),
                _ => Cell::Text(v.to_string()),
            },
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Cell::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v) => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            Cell::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Bool(true) => f.write_str("True"),
            Cell::Bool(false) => f.write_str("False"),
            Cell::Int(v) => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(text) => f.write_str(text),
            Cell::List(items) => f.write_str(&items.iter().join("|")),
        }
    }
}

/// One output row: named cells in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Cell)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a cell. An existing column keeps its position.
    pub fn set(&mut self, column: impl AsRef<str>, cell: Cell) {
        let column = column.as_ref();
        match self.cells.iter_mut().find(|(c, _)| c == column) {
            Some((_, slot)) => *slot = cell,
            None => self.cells.push((column.to_string(), cell)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.iter().find(|(c, _)| c == column).map(|(_, cell)| cell)
    }

    pub fn remove(&mut self, column: &str) -> Option<Cell> {
        let idx = self.cells.iter().position(|(c, _)| c == column)?;
        Some(self.cells.remove(idx).1)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(c, _)| c.as_str())
    }
}

impl Extend<(String, Cell)> for Row {
    fn extend<I: IntoIterator<Item = (String, Cell)>>(&mut self, iter: I) {
        for (column, cell) in iter {
            self.set(column, cell);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let mut table = Table::new();
        for row in rows {
            table.push(row);
        }
        table
    }

    pub fn push(&mut self, row: Row) {
        for column in row.columns() {
            if !self.columns.iter().any(|c| c == column) {
                self.columns.push(column.to_string());
            }
        }
        self.rows.push(row);
    }

    /// Appends every row of `other`; new columns are added at the end.
    pub fn append(&mut self, other: Table) {
        for row in other.rows {
            self.push(row);
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn drop_column(&mut self, column: &str) {
        self.columns.retain(|c| c != column);
        for row in &mut self.rows {
            row.remove(column);
        }
    }

    pub fn write_to<W: Write>(&self, writer: W) -> IResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.columns)?;
        for row in &self.rows {
            csv.write_record(self.columns.iter().map(|column| {
                row.get(column).map(|cell| cell.to_string()).unwrap_or_default()
            }))?;
        }
        csv.flush().map_err(|err| ErrorKind::Csv { err: err.into() })?;
        Ok(())
    }

    /// Writes the table as CSV. The file only appears once it is complete.
    pub fn write_csv(&self, path: &Path) -> IResult<()> {
        write_atomically(path, |writer| self.write_to(writer))
    }

    /// Reads a CSV file back. Every non-empty value becomes a text cell.
    ///
    /// A leading column with an empty header (a written-out row index) is
    /// dropped.
    pub fn read_from<R: Read>(reader: R) -> IResult<Table> {
        let mut csv = csv::Reader::from_reader(reader);
        let headers: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
        let skip_index = headers.first().is_some_and(|h| h.trim().is_empty());

        let mut table = Table::new();
        for record in csv.records() {
            let record = record?;
            let mut row = Row::new();
            for (idx, (column, value)) in headers.iter().zip(record.iter()).enumerate() {
                if idx == 0 && skip_index {
                    continue;
                }
                let cell = if value.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(value.to_string())
                };
                row.set(column, cell);
            }
            table.push(row);
        }
        Ok(table)
    }

    pub fn read_csv(path: &Path) -> IResult<Table> {
        let file = File::open(path).map_err(|err| ErrorKind::io(path, err))?;
        Table::read_from(file)
    }
}
