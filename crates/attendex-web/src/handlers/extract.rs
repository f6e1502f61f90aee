use std::path::Path;
use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::response::{IntoResponse, Response};

use attendex_reporting::ExportFormat;
use attendex_store::SyncReport;

use crate::error::AppError;
use crate::models::ExtractResponse;
use crate::state::AppState;
use crate::upload::{self, UploadedFile};

pub const STUDENTS_HEADER: HeaderName = HeaderName::from_static("x-attendex-students");
pub const SYNC_FAILURES_HEADER: HeaderName = HeaderName::from_static("x-attendex-sync-failures");

/// What one upload produced.
struct Extracted {
    csv: Vec<u8>,
    students: usize,
    subjects: usize,
    sync: SyncReport,
}

/// `POST /extract-attendance`: parse the uploaded report and sync every
/// student to the store. Responds with a JSON summary naming the generated
/// table, or with the CSV itself as an attachment when the client accepts
/// `text/csv`.
pub async fn extract_attendance(
    State(state): State<Arc<AppState>>,
    request_headers: HeaderMap,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let file = upload::parse_multipart(multipart).await?;

    let token = upload::request_token();
    let pdf_name = format!("{}_{}", token, upload::sanitize_filename(&file.filename));
    let csv_name = match pdf_name.rsplit_once('.') {
        Some((stem, _)) => format!("{}.csv", stem),
        None => format!("{}.csv", pdf_name),
    };

    let temp_dir = tempfile::Builder::new()
        .prefix("attendex-")
        .tempdir()
        .map_err(|e| AppError::internal("Failed to create temp directory", e))?;
    let pdf_path = temp_dir.path().join(&pdf_name);
    let csv_path = temp_dir.path().join(&csv_name);

    tracing::info!(upload = %file.filename, bytes = file.data.len(), "received report");

    let worker_state = state.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        process_upload(&worker_state, file, &pdf_path, &csv_path)
    })
    .await
    .map_err(|e| AppError::internal("Extraction task failed", e));

    // Both files go whether or not extraction succeeded.
    let dir_display = temp_dir.path().display().to_string();
    if let Err(e) = temp_dir.close() {
        tracing::warn!(dir = %dir_display, error = %e, "failed to remove upload files");
    }

    let extracted = outcome??;
    if !extracted.sync.is_complete() {
        tracing::warn!(
            failed = extracted.sync.failed.len(),
            "some students were not synced to the store"
        );
    }

    let counts = [
        (STUDENTS_HEADER, HeaderValue::from(extracted.students)),
        (
            SYNC_FAILURES_HEADER,
            HeaderValue::from(extracted.sync.failed.len()),
        ),
    ];

    if !accepts_csv(&request_headers) {
        let body = ExtractResponse {
            message: "Upload and processing successful.",
            csv_filename: csv_name,
            students: extracted.students,
            subjects: extracted.subjects,
            sync_failures: extracted.sync.failed.len(),
        };
        return Ok((counts, Json(body)).into_response());
    }

    let disposition = format!("attachment; filename=\"{}\"", csv_name);
    let file_headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static(ExportFormat::Csv.content_type()),
        ),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::try_from(disposition)
                .map_err(|e| AppError::internal("Invalid attachment name", e))?,
        ),
    ];
    Ok((file_headers, counts, Bytes::from(extracted.csv)).into_response())
}

/// True when the `Accept` header asks for `text/csv`.
fn accepts_csv(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|media| {
            media
                .split(';')
                .next()
                .is_some_and(|m| m.trim().eq_ignore_ascii_case("text/csv"))
        })
}

/// Blocking half of the request: write the upload, extract, export, sync.
fn process_upload(
    state: &AppState,
    file: UploadedFile,
    pdf_path: &Path,
    csv_path: &Path,
) -> Result<Extracted, AppError> {
    std::fs::write(pdf_path, &file.data)
        .map_err(|e| AppError::internal("Failed to write temp file", e))?;

    let table = state
        .extractor
        .extract_via_backend(pdf_path, state.backend.as_ref())?;

    attendex_reporting::write_table(&table, ExportFormat::Csv, csv_path)
        .map_err(|e| AppError::internal("Failed to write CSV", e))?;

    let sync = attendex_store::sync_table(state.store.as_ref(), &table);

    let csv = std::fs::read(csv_path).map_err(|e| AppError::internal("Failed to read CSV", e))?;
    Ok(Extracted {
        csv,
        students: table.len(),
        subjects: table.subject_columns().len(),
        sync,
    })
}
