use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod config_file;
pub mod table;

pub use table::{AttendanceTable, Cell, IDENTITY_COLUMNS};

/// Subject code → attendance percentage.
///
/// A `BTreeMap` so that iteration (and therefore every serialized form) is
/// ordered by subject code.
pub type AttendanceMap = BTreeMap<String, f64>;

/// One student block extracted from an attendance report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    /// Ordinal as printed in the report. Not renumbered: a malformed report
    /// may skip or repeat numbers and that is preserved.
    pub sequence_number: u32,
    /// Two-letter prefix followed by 13 digits; the document-store key.
    pub registration_id: String,
    /// Upper-case name, trimmed.
    pub full_name: String,
    /// Only the subjects actually found for this student.
    pub attendance: AttendanceMap,
}

impl StudentRecord {
    pub fn new(sequence_number: u32, registration_id: &str, full_name: &str) -> Self {
        Self {
            sequence_number,
            registration_id: registration_id.to_string(),
            full_name: full_name.trim().to_string(),
            attendance: AttendanceMap::new(),
        }
    }

    /// Builder-style helper, mostly for tests and fixtures.
    pub fn with_subject(mut self, code: &str, percentage: f64) -> Self {
        self.attendance.insert(code.to_string(), percentage);
        self
    }
}

/// The persisted shape of a student in a [`DocumentStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentDocument {
    pub registration_id: String,
    pub attendance: AttendanceMap,
}

/// Whether an upsert created a new document or merged into an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
}

/// Trait for PDF text extraction backends.
///
/// Implementors provide per-page plain text; segmentation and field
/// extraction live in `attendex-parsing`.
pub trait PdfBackend: Send + Sync {
    /// Extract the text of every page, in page order.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError>;

    /// Full document text: pages joined with a newline.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        Ok(self.extract_pages(path)?.join("\n"))
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document store unavailable: {0}")]
    Unavailable(String),
    #[error("document store error: {0}")]
    Backend(String),
}

/// A keyed document store holding one attendance document per student.
///
/// Implementations must be safe to share between in-flight requests; the
/// process holds a single handle and passes it around explicitly.
pub trait DocumentStore: Send + Sync {
    /// Merge `attendance` into the document keyed by `registration_id`,
    /// creating it if absent. Keys not present in `attendance` are left
    /// untouched, so applying the same map twice is a no-op the second time.
    fn upsert_attendance(
        &self,
        registration_id: &str,
        attendance: &AttendanceMap,
    ) -> Result<UpsertOutcome, StoreError>;

    /// Read a stored document back.
    fn get(&self, registration_id: &str) -> Result<Option<StudentDocument>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PagesBackend(Vec<&'static str>);

    impl PdfBackend for PagesBackend {
        fn extract_pages(&self, _path: &Path) -> Result<Vec<String>, BackendError> {
            Ok(self.0.iter().map(|p| p.to_string()).collect())
        }
    }

    #[test]
    fn extract_text_joins_pages_in_order() {
        let backend = PagesBackend(vec!["page one", "page two", "page three"]);
        let text = backend.extract_text(Path::new("ignored.pdf")).unwrap();
        assert_eq!(text, "page one\npage two\npage three");
    }

    #[test]
    fn student_record_trims_name() {
        let rec = StudentRecord::new(4, "RA1234567890123", "  JOHN DOE ");
        assert_eq!(rec.full_name, "JOHN DOE");
        assert!(rec.attendance.is_empty());
    }
}
