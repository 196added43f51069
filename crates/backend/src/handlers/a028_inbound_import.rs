use axum::{extract::Query, Json};
use contracts::domain::a028_inbound_import::InboundImportRecord;
use serde::Deserialize;

use crate::domain::a028_inbound_import;

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<u64>,
}

/// GET /api/a028/inbound-import
pub async fn list_recent(
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<InboundImportRecord>>, axum::http::StatusCode> {
    match a028_inbound_import::service::list_recent(query.limit).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list inbound imports: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
