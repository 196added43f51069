use contracts::domain::a026_stock_box::StockBox;
use contracts::usecases::u508_inbound_import::BoxLabel;
use uuid::Uuid;

use super::repository;
use crate::domain::a027_stock_item;
use crate::shared::data::db::get_connection;
use crate::usecases::u508_inbound_import::label_emitter;
use crate::usecases::u508_inbound_import::reconciliation::BoxGroup;

pub async fn get_by_id(id: Uuid) -> anyhow::Result<Option<StockBox>> {
    Ok(repository::get_by_id(get_connection(), id).await?)
}

/// Перепечатка этикетки для уже принятой коробки из сохранённых IMEI
pub async fn label_for_box(id: Uuid) -> anyhow::Result<Option<BoxLabel>> {
    let db = get_connection();
    let Some(stock_box) = repository::get_by_id(db, id).await? else {
        return Ok(None);
    };
    let identifiers = a027_stock_item::repository::list_identifiers_by_box(db, id).await?;
    let group = BoxGroup {
        device: stock_box.device,
        box_no: stock_box.box_no,
        identifiers: identifiers.into_iter().collect(),
    };
    Ok(Some(label_emitter::build_label(&group)))
}
