use axum::extract::DefaultBodyLimit;
use axum::http::{StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use carbonflow_core::storage::EmissionStore;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::routes;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EmissionStore>,
}

/// Create the HTTP server router
pub fn create_server(store: Arc<dyn EmissionStore>) -> Router {
    let state = AppState { store };

    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/upload", post(routes::upload::upload))
        .route("/api/emissions", post(routes::emissions::add_emission))
        .route("/api/emissions/sankey", get(routes::emissions::sankey))
        .route("/api/exports/pdf", post(routes::exports::export_pdf))
        .route("/api/exports/excel", post(routes::exports::export_excel))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not Found",
            "message": format!("La route {uri} n'existe pas"),
        })),
    )
}

/// Start the HTTP server
pub async fn start_server(store: Arc<dyn EmissionStore>, port: u16) -> anyhow::Result<()> {
    let app = create_server(store);
    let addr = format!("0.0.0.0:{port}");

    println!("🚀 HTTP server running on http://{addr}");
    println!("💚 Health check: http://{addr}/api/health");
    println!("📈 Sankey data:  http://{addr}/api/emissions/sankey");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
