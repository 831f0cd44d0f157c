use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use carbonflow_core::common::error::StorageError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Le fichier est vide")]
    EmptyFile,

    #[error("Colonnes manquantes: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("No valid data found in file")]
    NoValidData,

    #[error("No emissions data found")]
    NoData,

    #[error("Invalid emission payload: {0}")]
    InvalidPayload(String),

    #[error("Failed to read uploaded file: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Failed to parse CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Failed to generate PDF report: {0}")]
    Pdf(String),

    #[error("Failed to generate Excel file: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Client-detectable ingestion problems are 4xx; storage, parsing
    /// infrastructure, and rendering failures are 5xx.
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFile
            | ApiError::EmptyFile
            | ApiError::MissingColumns(_)
            | ApiError::NoValidData
            | ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::NoData
            | ApiError::Multipart(_)
            | ApiError::Csv(_)
            | ApiError::Spreadsheet(_)
            | ApiError::Storage(_)
            | ApiError::Pdf(_)
            | ApiError::Excel(_)
            | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_columns_message_lists_names_in_order() {
        let err = ApiError::MissingColumns(vec!["scope".to_string(), "emissions_co2".to_string()]);
        assert_eq!(err.to_string(), "Colonnes manquantes: scope, emissions_co2");
    }

    #[test]
    fn ingestion_errors_are_client_errors() {
        assert_eq!(ApiError::EmptyFile.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NoValidData.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NoData.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
