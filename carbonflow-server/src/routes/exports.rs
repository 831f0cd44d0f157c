use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use tracing::info;

use crate::error::ApiError;
use crate::export::{excel, pdf};
use crate::server::AppState;

/// Generate and stream the PDF report.
pub async fn export_pdf(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    info!("Starting PDF export...");

    let records = state.store.all_records().await?;
    if records.is_empty() {
        return Err(ApiError::NoData);
    }
    info!("Found {} emission records", records.len());

    let bytes = pdf::render_document(&records)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=emissions-report.pdf",
            ),
        ],
        bytes,
    ))
}

/// Generate and stream the Excel workbook.
pub async fn export_excel(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    info!("Starting Excel export...");

    let records = state.store.all_records().await?;
    if records.is_empty() {
        return Err(ApiError::NoData);
    }
    info!("Found {} emission records", records.len());

    let bytes = excel::render_spreadsheet(&records)?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=emissions-data.xlsx",
            ),
        ],
        bytes,
    ))
}
