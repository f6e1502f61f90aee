use std::path::Path;

use attendex_core::{AttendanceTable, PdfBackend, StudentRecord};

use crate::ParsingError;
use crate::config::ParsingConfig;
use crate::fields::{attendance_map, extract_fields_with_config};
use crate::segment::segment_students_with_config;

/// Runs the full text → table pipeline with a fixed [`ParsingConfig`].
///
/// Stateless apart from the config, so one extractor can be shared across
/// requests.
#[derive(Debug, Clone, Default)]
pub struct AttendanceExtractor {
    config: ParsingConfig,
}

impl AttendanceExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParsingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParsingConfig {
        &self.config
    }

    /// Segment the text and parse each segment into a [`StudentRecord`].
    ///
    /// Any unparseable captured number aborts the whole extraction; no
    /// partial result is returned.
    pub fn extract_records(&self, text: &str) -> Result<Vec<StudentRecord>, ParsingError> {
        let segments = segment_students_with_config(text, &self.config)?;

        let mut records = Vec::with_capacity(segments.len());
        for segment in &segments {
            let fields = extract_fields_with_config(segment.body, &self.config)?;
            if fields.is_empty() {
                tracing::debug!(
                    registration_id = segment.header.registration_id,
                    "no subject attendance found for student"
                );
            }

            let header = &segment.header;
            records.push(StudentRecord {
                sequence_number: header.sequence_number,
                registration_id: header.registration_id.to_string(),
                full_name: header.full_name.to_string(),
                attendance: attendance_map(&fields),
            });
        }
        Ok(records)
    }

    /// Extract and normalize report text into an [`AttendanceTable`].
    pub fn extract_from_text(&self, text: &str) -> Result<AttendanceTable, ParsingError> {
        let table = AttendanceTable::from_records(self.extract_records(text)?);
        tracing::info!(
            students = table.len(),
            subjects = table.subject_columns().len(),
            "extracted attendance table"
        );
        Ok(table)
    }

    /// Extract text from a PDF via `backend`, then run the pipeline.
    pub fn extract_via_backend(
        &self,
        pdf_path: &Path,
        backend: &dyn PdfBackend,
    ) -> Result<AttendanceTable, ParsingError> {
        let text = backend.extract_text(pdf_path)?;
        self.extract_from_text(&text)
    }
}
