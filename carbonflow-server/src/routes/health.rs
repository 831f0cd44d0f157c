use axum::response::IntoResponse;
use axum::Json;
use carbonflow_core::database::DB_PATH_ENV;
use chrono::Utc;
use serde_json::json;
use std::env;

/// Reports storage-configuration presence, not live connectivity.
pub async fn health() -> impl IntoResponse {
    let database = if env::var(DB_PATH_ENV).is_ok() {
        "configured"
    } else {
        "not configured"
    };

    Json(json!({
        "status": "OK",
        "timestamp": Utc::now(),
        "services": {
            "database": database,
        },
    }))
}
