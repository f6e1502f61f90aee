use std::num::ParseIntError;
use std::path::Path;

use thiserror::Error;

pub mod config;
pub mod extractor;
pub mod fields;
pub mod patterns;
pub mod segment;

pub use config::{ConfigError, ParsingConfig, ParsingConfigBuilder};
pub use extractor::AttendanceExtractor;
pub use fields::SubjectField;
pub use segment::{Segment, StudentHeader};
// Re-export domain types from core (canonical definitions live there)
pub use attendex_core::{AttendanceTable, BackendError, PdfBackend, StudentRecord};

#[derive(Error, Debug)]
pub enum ParsingError {
    #[error("invalid sequence number {value:?} for {registration_id}: {source}")]
    InvalidSequenceNumber {
        registration_id: String,
        value: String,
        source: ParseIntError,
    },
    #[error("invalid attendance percentage {value:?} for {subject}: {reason}")]
    InvalidPercentage {
        subject: String,
        value: String,
        reason: String,
    },
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}

impl ParsingError {
    /// True for errors caused by the report content rather than the
    /// text extractor.
    pub fn is_parse_failure(&self) -> bool {
        !matches!(self, ParsingError::Backend(_))
    }
}

/// Extract the attendance table from a PDF report using the given backend.
///
/// Pipeline:
/// 1. Extract per-page text via `backend`, joined with newlines
/// 2. Split the text into one segment per student header
/// 3. Collect subject/percentage pairs inside each segment
/// 4. Normalize into a table with sorted subject columns
pub fn extract_attendance(
    pdf_path: &Path,
    backend: &dyn PdfBackend,
) -> Result<AttendanceTable, ParsingError> {
    AttendanceExtractor::new().extract_via_backend(pdf_path, backend)
}
