use chrono::Utc;
use contracts::domain::a028_inbound_import::{InboundImportId, InboundImportRecord};
use contracts::enums::StockLocation;
use contracts::usecases::u508_inbound_import::ImportCounts;
use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use super::error::ImportError;
use super::reconciliation::{conflict_error, CommitPlan};
use crate::domain::a027_stock_item::repository::NewStockItem;
use crate::domain::{a026_stock_box, a027_stock_item, a028_inbound_import};
use crate::shared::config::InboundImportSettings;

/// Кто и что принимает
#[derive(Debug, Clone)]
pub struct CommitContext<'a> {
    pub file_name: &'a str,
    pub location: StockLocation,
    pub actor: &'a str,
}

#[derive(Debug, Clone)]
pub struct CommitSummary {
    pub import_id: Uuid,
    pub counts: ImportCounts,
}

/// Применить план одной транзакцией: коробки, IMEI, запись журнала
///
/// Наличие IMEI в хранилище проверяется повторно внутри транзакции. Любая ошибка
/// до `commit()` откатывает все записи этой приёмки.
pub async fn commit(
    db: &DatabaseConnection,
    plan: &CommitPlan,
    ctx: &CommitContext<'_>,
    settings: &InboundImportSettings,
) -> Result<CommitSummary, ImportError> {
    let started = std::time::Instant::now();
    let txn = db.begin().await?;

    let identifiers = plan.identifiers();
    let conflicts = a027_stock_item::repository::find_existing_identifiers(
        &txn,
        &identifiers,
        settings.lookup_batch_size,
    )
    .await?;
    if !conflicts.is_empty() {
        tracing::warn!(
            "Commit aborted: {} identifier(s) appeared in store after reconciliation",
            conflicts.len()
        );
        txn.rollback().await?;
        return Err(conflict_error(conflicts, settings.conflict_preview_limit));
    }

    let keys = plan.box_keys();
    let already_present =
        a026_stock_box::repository::find_boxes(&txn, &keys, settings.lookup_batch_size).await?;
    let box_ids = a026_stock_box::repository::find_or_create_boxes(
        &txn,
        &keys,
        ctx.location,
        settings.insert_batch_size,
    )
    .await?;
    let boxes_created = keys.len() - already_present.len();

    let mut items = Vec::with_capacity(plan.items_to_insert.len());
    for planned in &plan.items_to_insert {
        let box_id = box_ids.get(&planned.box_key).copied().ok_or_else(|| {
            ImportError::Store(format!("no box id for {}", planned.box_key))
        })?;
        items.push(NewStockItem {
            identifier: planned.identifier.clone(),
            box_id,
        });
    }

    let import_id = Uuid::new_v4();
    let inserted = a027_stock_item::repository::insert_items(
        &txn,
        &items,
        ctx.location,
        import_id,
        settings.insert_batch_size,
    )
    .await?;

    let mut counts = plan.counts();
    counts.new_boxes = boxes_created;
    counts.items = inserted;

    let record = InboundImportRecord {
        id: InboundImportId::new(import_id),
        file_name: ctx.file_name.to_string(),
        location: ctx.location,
        actor: ctx.actor.to_string(),
        devices_count: counts.devices as i64,
        boxes_count: counts.boxes as i64,
        new_boxes_count: counts.new_boxes as i64,
        items_count: counts.items as i64,
        created_at: Utc::now(),
    };
    a028_inbound_import::repository::insert(&txn, &record).await?;

    txn.commit().await?;

    tracing::info!(
        "Import {} committed: {} box(es) created, {} item(s) inserted in {}ms",
        import_id,
        boxes_created,
        inserted,
        started.elapsed().as_millis()
    );
    Ok(CommitSummary { import_id, counts })
}
