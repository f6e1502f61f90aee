use axum::extract::Multipart;

use crate::error::AppError;

/// Name of the multipart field carrying the report.
pub const PDF_FIELD: &str = "pdf";

/// An uploaded report with its data and client-supplied name.
pub struct UploadedFile {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Pull the `pdf` field out of a multipart upload. Other fields are drained
/// and ignored.
pub async fn parse_multipart(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InputMissing(format!("Failed to read form field: {}", e)))?
    {
        if field.name() == Some(PDF_FIELD) {
            let filename = field.file_name().unwrap_or("upload.pdf").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InputMissing(format!("Failed to read file data: {}", e)))?
                .to_vec();
            file = Some(UploadedFile { filename, data });
        } else {
            let _ = field.bytes().await;
        }
    }

    file.ok_or_else(|| AppError::InputMissing("No PDF uploaded".to_string()))
}

/// Reduce a client filename to `[A-Za-z0-9._-]`, dropping any directory
/// part and leading dots.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Random 32-character hex token used to keep concurrent uploads apart.
pub fn request_token() -> String {
    (0..16).map(|_| format!("{:02x}", fastrand::u8(..))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename(r"C:\reports\sem 5.pdf"), "sem_5.pdf");
    }

    #[test]
    fn sanitize_drops_odd_characters() {
        assert_eq!(sanitize_filename("attendance (final).pdf"), "attendance_final.pdf");
        assert_eq!(sanitize_filename(".hidden.pdf"), "hidden.pdf");
        assert_eq!(sanitize_filename("***"), "upload.pdf");
    }

    #[test]
    fn tokens_are_hex_and_distinct() {
        let a = request_token();
        let b = request_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
