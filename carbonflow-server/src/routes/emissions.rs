use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use carbonflow_core::domain::{EmissionRecord, UNCATEGORIZED};
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::processing::sankey;
use crate::server::AppState;

/// Flow-graph data for the Sankey diagram. An empty table yields an empty
/// graph rather than an error.
pub async fn sankey(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let records = state.store.all_records().await?;
    if records.is_empty() {
        info!("No emissions data found");
    }

    Ok(Json(sankey::build(&records)))
}

#[derive(Debug, Deserialize)]
pub struct NewEmission {
    pub company_name: String,
    pub scope: u8,
    pub category: Option<String>,
    pub value: f64,
    pub year: Option<i32>,
}

/// Insert a single emission record from a JSON payload.
pub async fn add_emission(
    State(state): State<AppState>,
    Json(payload): Json<NewEmission>,
) -> Result<impl IntoResponse, ApiError> {
    let company = payload.company_name.trim();
    if company.is_empty() {
        return Err(ApiError::InvalidPayload("company_name is required".to_string()));
    }
    if !(1..=3).contains(&payload.scope) {
        return Err(ApiError::InvalidPayload("scope must be 1, 2 or 3".to_string()));
    }
    if !payload.value.is_finite() || payload.value < 0.0 {
        return Err(ApiError::InvalidPayload("value must be a non-negative number".to_string()));
    }

    let category = payload
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNCATEGORIZED.to_string());

    let mut record = EmissionRecord {
        id: None,
        company: company.to_string(),
        scope: payload.scope,
        category,
        value: payload.value,
        year: payload.year.unwrap_or_else(|| Utc::now().year()),
        created_at: Utc::now(),
    };
    state.store.insert_records(std::slice::from_mut(&mut record)).await?;
    info!("Inserted emission record for {}", record.company);

    Ok((StatusCode::CREATED, Json(record)))
}
