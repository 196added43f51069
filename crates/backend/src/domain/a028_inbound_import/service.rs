use contracts::domain::a028_inbound_import::InboundImportRecord;

use super::repository;
use crate::shared::data::db::get_connection;

const MAX_LIST_LIMIT: u64 = 500;

pub async fn list_recent(limit: Option<u64>) -> anyhow::Result<Vec<InboundImportRecord>> {
    let limit = limit.unwrap_or(50).clamp(1, MAX_LIST_LIMIT);
    Ok(repository::list_recent(get_connection(), limit).await?)
}
