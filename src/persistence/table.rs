use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::row::Record;

/// The ordered records of one table.
///
/// A [`Table`] is the dumb half of the store: it holds rows and knows how to
/// filter, append and remove them. Validation and schema bookkeeping live in
/// [`super::Database`]. The table name is the key it is stored under, so the
/// on-disk form is just the array of records.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Record>,
}

impl Table {
    pub fn new() -> Table {
        Table { rows: Vec::new() }
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn scan(&self) -> Vec<Record> {
        //! Returns a copy of all the rows of the table.

        self.rows.clone()
    }

    pub fn filter<F>(&self, filter: F) -> Vec<Record>
    where
        F: Fn(&Record) -> bool,
    {
        //! Clones the rows matching the filter, in table order.

        self.rows.iter().filter(|row| filter(*row)).cloned().collect()
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.rows.push(record);
    }

    pub(crate) fn positions<F>(&self, filter: F) -> Vec<usize>
    where
        F: Fn(&Record) -> bool,
    {
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| filter(row).then_some(index))
            .collect()
    }

    pub(crate) fn replace_rows(&mut self, rows: Vec<Record>) {
        self.rows = rows;
    }

    pub(crate) fn delete_with_filter<F>(&mut self, filter: F) -> usize
    where
        F: Fn(&Record) -> bool,
    {
        //! Drop every row matching the filter.
        //!
        //! Returns the number of rows removed.

        let before = self.rows.len();
        self.rows.retain(|row| !filter(row));
        before - self.rows.len()
    }

    pub(crate) fn delete_all(&mut self) -> usize {
        let deleted = self.rows.len();
        self.rows.clear();
        deleted
    }

    pub(crate) fn max_numeric(&self, column: &str) -> Option<u64> {
        //! Largest non-negative integer held in `column`, if any.

        self.rows
            .iter()
            .filter_map(|row| row.get(column).and_then(Value::as_u64))
            .max()
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rows: Vec<String> = self.rows.iter().map(|row| format!("{}", row)).collect();
        write!(f, "{}", rows.join("\n"))
    }
}
