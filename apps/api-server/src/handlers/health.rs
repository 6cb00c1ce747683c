//! Health check endpoint.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
}

/// GET /api/health
///
/// Reports `degraded` when the database stops answering pings.
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let (status, storage) = storage_status(&state).await;

    HttpResponse::Ok().json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        storage,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(feature = "postgres")]
async fn storage_status(state: &AppState) -> (&'static str, &'static str) {
    match &state.db {
        Some(db) => match db.ping().await {
            Ok(()) => ("ok", "postgres"),
            Err(e) => {
                tracing::error!(error = %e, "Database ping failed");
                ("degraded", "postgres")
            }
        },
        None => ("ok", "memory"),
    }
}

#[cfg(not(feature = "postgres"))]
async fn storage_status(_state: &AppState) -> (&'static str, &'static str) {
    ("ok", "memory")
}
