use axum::Json;
use contracts::domain::a025_device::DeviceCatalogEntry;

use crate::domain::a025_device;

/// GET /api/a025/device
pub async fn list_all() -> Result<Json<Vec<DeviceCatalogEntry>>, axum::http::StatusCode> {
    match a025_device::service::list_all().await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to load device catalog: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/a025/device
pub async fn upsert(
    Json(entry): Json<DeviceCatalogEntry>,
) -> Result<Json<DeviceCatalogEntry>, axum::http::StatusCode> {
    if entry.validate().is_err() {
        return Err(axum::http::StatusCode::BAD_REQUEST);
    }
    match a025_device::service::upsert(entry).await {
        Ok(saved) => Ok(Json(saved)),
        Err(e) => {
            tracing::error!("Failed to save device: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
