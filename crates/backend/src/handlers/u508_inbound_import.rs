use axum::{
    extract::Multipart,
    response::{IntoResponse, Response},
    Json,
};
use contracts::enums::StockLocation;
use contracts::usecases::u508_inbound_import::{InboundImportResponse, InboundPreviewResponse};
use serde_json::json;

use crate::shared::config::get_config;
use crate::shared::data::db::get_connection;
use crate::system::auth::extractor::CurrentUser;
use crate::usecases::u508_inbound_import::{ImportError, InboundImportExecutor};

/// Содержимое multipart-запроса приёмки
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
    location: Option<String>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, ImportError> {
    let mut file = None;
    let mut location = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImportError::Unreadable(e.to_string()))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ImportError::Unreadable(e.to_string()))?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("location") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ImportError::Unreadable(e.to_string()))?;
                location = Some(text);
            }
            _ => {}
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ImportError::MissingField("file".to_string()))?;
    Ok(Upload {
        file_name,
        bytes,
        location,
    })
}

fn parse_location(raw: Option<&str>) -> Result<StockLocation, ImportError> {
    let raw = raw.ok_or_else(|| ImportError::MissingField("location".to_string()))?;
    StockLocation::from_code(raw).ok_or_else(|| ImportError::InvalidLocation(raw.to_string()))
}

fn failure_response(err: ImportError) -> Response {
    let limit = get_config().inbound_import.issue_preview_limit;
    (err.status_code(), Json(err.to_failure(limit))).into_response()
}

async fn run_import(
    user: &CurrentUser,
    multipart: Multipart,
) -> Result<InboundImportResponse, ImportError> {
    let upload = read_upload(multipart).await?;
    let location = parse_location(upload.location.as_deref())?;
    let settings = &get_config().inbound_import;
    InboundImportExecutor::new(get_connection(), settings)
        .execute(&upload.file_name, &upload.bytes, location, user.actor())
        .await
}

async fn run_preview(multipart: Multipart) -> Result<InboundPreviewResponse, ImportError> {
    let upload = read_upload(multipart).await?;
    let settings = &get_config().inbound_import;
    InboundImportExecutor::new(get_connection(), settings)
        .preview(&upload.file_name, &upload.bytes)
        .await
}

/// POST /api/u508/inbound-import
pub async fn import(user: CurrentUser, multipart: Multipart) -> Response {
    match run_import(&user, multipart).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            tracing::warn!("Inbound import rejected ({:?}): {}", e.reason(), e);
            failure_response(e)
        }
    }
}

/// POST /api/u508/inbound-import/preview
pub async fn preview(multipart: Multipart) -> Response {
    match run_preview(multipart).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => failure_response(e),
    }
}

/// GET /api/u508/inbound-import/locations
pub async fn locations() -> Json<serde_json::Value> {
    let items: Vec<_> = StockLocation::all()
        .into_iter()
        .map(|l| json!({"code": l.code(), "displayName": l.display_name()}))
        .collect();
    Json(json!(items))
}
