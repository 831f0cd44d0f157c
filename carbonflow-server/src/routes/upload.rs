use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::ingest::{normalize, tabular, validate};
use crate::server::AppState;

/// Receive a CSV/XLSX upload, validate and normalize it, and persist the
/// resulting records. The payload is spooled to a temp file which is removed
/// on every exit path when the `NamedTempFile` drops.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut spooled: Option<(NamedTempFile, tabular::FileKind)> = None;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.csv").to_string();
        let content_type = field.content_type().map(str::to_string);
        let kind = tabular::FileKind::detect(&filename, content_type.as_deref());

        let mut file = NamedTempFile::new()?;
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk)?;
        }
        file.flush()?;

        info!("Received upload {} ({:?})", filename, kind);
        spooled = Some((file, kind));
        break;
    }

    let (file, kind) = spooled.ok_or(ApiError::MissingFile)?;

    let parsed = tabular::read_file(file.path(), kind)?;
    validate::validate(&parsed)?;

    let mut records = normalize::normalize_rows(&parsed.rows);
    let dropped = parsed.rows.len() - records.len();
    if dropped > 0 {
        warn!("Dropped {} invalid rows from upload", dropped);
    }
    if records.is_empty() {
        return Err(ApiError::NoValidData);
    }

    state.store.insert_records(&mut records).await?;
    info!("Inserted {} emission records from upload", records.len());

    Ok(Json(json!({
        "message": "File uploaded and processed successfully",
        "rowsInserted": records.len(),
    })))
}
