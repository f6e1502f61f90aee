//! Table normalization.
//!
//! Turns a list of per-student records with ragged attendance maps into a
//! rectangular table: identity columns first, then every subject code seen
//! in the run, sorted. Cells for subjects a student has no value for are
//! [`Cell::Missing`], never zero.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::StudentRecord;

/// Leading columns of every materialized row.
pub const IDENTITY_COLUMNS: [&str; 3] = ["S.No", "Reg No", "Name"];

/// One cell of a materialized row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Integer(u32),
    Text(&'a str),
    Percentage(f64),
    /// No value recorded for this subject (distinct from 0%).
    Missing,
}

impl Cell<'_> {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

/// Normalized output of one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceTable {
    columns: Vec<String>,
    #[serde(rename = "students")]
    records: Vec<StudentRecord>,
}

impl AttendanceTable {
    /// Build the table, deriving the subject columns as the sorted union of
    /// every record's subject codes.
    pub fn from_records(records: Vec<StudentRecord>) -> Self {
        let columns: Vec<String> = records
            .iter()
            .flat_map(|r| r.attendance.keys())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();
        Self { columns, records }
    }

    /// Records in source order.
    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<StudentRecord> {
        self.records
    }

    /// Sorted subject codes, without the identity columns.
    pub fn subject_columns(&self) -> &[String] {
        &self.columns
    }

    /// Full header: identity columns followed by subject columns.
    pub fn header(&self) -> Vec<&str> {
        IDENTITY_COLUMNS
            .iter()
            .copied()
            .chain(self.columns.iter().map(String::as_str))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Materialize row `index` in header order.
    pub fn row(&self, index: usize) -> Option<Vec<Cell<'_>>> {
        self.records.get(index).map(|r| self.materialize(r))
    }

    /// Materialize every row in header order.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Cell<'_>>> + '_ {
        self.records.iter().map(|r| self.materialize(r))
    }

    fn materialize<'a>(&'a self, record: &'a StudentRecord) -> Vec<Cell<'a>> {
        let mut cells = Vec::with_capacity(IDENTITY_COLUMNS.len() + self.columns.len());
        cells.push(Cell::Integer(record.sequence_number));
        cells.push(Cell::Text(&record.registration_id));
        cells.push(Cell::Text(&record.full_name));
        for code in &self.columns {
            cells.push(match record.attendance.get(code) {
                Some(&pct) => Cell::Percentage(pct),
                None => Cell::Missing,
            });
        }
        cells
    }
}
