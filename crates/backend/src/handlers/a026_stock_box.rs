use axum::{extract::Path, Json};
use contracts::domain::a026_stock_box::StockBox;
use contracts::usecases::u508_inbound_import::BoxLabel;

use crate::domain::a026_stock_box;

/// GET /api/a026/stock-box/:id
pub async fn get_by_id(Path(id): Path<String>) -> Result<Json<StockBox>, axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a026_stock_box::service::get_by_id(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(_) => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// GET /api/a026/stock-box/:id/label
pub async fn label(Path(id): Path<String>) -> Result<Json<BoxLabel>, axum::http::StatusCode> {
    let uuid = match uuid::Uuid::parse_str(&id) {
        Ok(uuid) => uuid,
        Err(_) => return Err(axum::http::StatusCode::BAD_REQUEST),
    };
    match a026_stock_box::service::label_for_box(uuid).await {
        Ok(Some(v)) => Ok(Json(v)),
        Ok(None) => Err(axum::http::StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to build label for box {}: {}", id, e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
