use serde::Serialize;

/// JSON body of a successful `POST /extract-attendance`.
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub message: &'static str,
    /// Name of the generated table. Send `Accept: text/csv` to receive the
    /// file itself instead of this summary.
    pub csv_filename: String,
    pub students: usize,
    pub subjects: usize,
    pub sync_failures: usize,
}
