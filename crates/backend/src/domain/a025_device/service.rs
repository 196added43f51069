use contracts::domain::a025_device::DeviceCatalogEntry;

use super::repository;
use crate::shared::data::db::get_connection;

pub async fn list_all() -> anyhow::Result<Vec<DeviceCatalogEntry>> {
    Ok(repository::load_catalog(get_connection()).await?)
}

pub async fn upsert(entry: DeviceCatalogEntry) -> anyhow::Result<DeviceCatalogEntry> {
    entry.validate().map_err(|e| anyhow::anyhow!(e))?;
    repository::upsert(get_connection(), &entry).await?;
    tracing::info!(
        "Device {} ({}) saved, active={}",
        entry.canonical_key,
        entry.display_name,
        entry.active
    );
    Ok(entry)
}
