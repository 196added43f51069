use chrono::Utc;
use contracts::domain::a026_stock_box::StockBoxId;
use contracts::enums::StockLocation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a027_stock_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub identifier: String,
    pub box_id: String,
    pub location: String,
    pub import_id: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Единица товара к вставке
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockItem {
    pub identifier: String,
    pub box_id: StockBoxId,
}

/// Какие из переданных IMEI уже есть в хранилище
///
/// Результат отсортирован и без повторов.
pub async fn find_existing_identifiers<C: ConnectionTrait>(
    db: &C,
    identifiers: &[String],
    batch_size: usize,
) -> Result<Vec<String>, DbErr> {
    let mut existing = Vec::new();
    for chunk in identifiers.chunks(batch_size.max(1)) {
        let found: Vec<String> = Entity::find()
            .select_only()
            .column(Column::Identifier)
            .filter(Column::Identifier.is_in(chunk.iter().map(String::as_str)))
            .into_tuple()
            .all(db)
            .await?;
        existing.extend(found);
    }
    existing.sort();
    existing.dedup();
    Ok(existing)
}

/// Вставить единицы товара пачками по `batch_size`
pub async fn insert_items<C: ConnectionTrait>(
    db: &C,
    items: &[NewStockItem],
    location: StockLocation,
    import_id: Uuid,
    batch_size: usize,
) -> Result<usize, DbErr> {
    let created_at = Utc::now().to_rfc3339();
    let import_id = import_id.to_string();
    let mut inserted = 0;
    for chunk in items.chunks(batch_size.max(1)) {
        let models = chunk.iter().map(|item| ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            identifier: Set(item.identifier.clone()),
            box_id: Set(item.box_id.value().to_string()),
            location: Set(location.code().to_string()),
            import_id: Set(import_id.clone()),
            created_at: Set(created_at.clone()),
        });
        Entity::insert_many(models).exec_without_returning(db).await?;
        inserted += chunk.len();
    }
    Ok(inserted)
}

/// IMEI в коробке, по возрастанию
pub async fn list_identifiers_by_box<C: ConnectionTrait>(
    db: &C,
    box_id: Uuid,
) -> Result<Vec<String>, DbErr> {
    Entity::find()
        .select_only()
        .column(Column::Identifier)
        .filter(Column::BoxId.eq(box_id.to_string()))
        .order_by_asc(Column::Identifier)
        .into_tuple()
        .all(db)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a026_stock_box::repository::find_or_create_boxes;
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a026_stock_box::BoxKey;

    #[tokio::test]
    async fn test_insert_then_lookup_in_small_batches() {
        let db = connect_in_memory().await;
        let key = BoxKey::new("FMB140", "076-004");
        let boxes = find_or_create_boxes(&db, &[key.clone()], StockLocation::MainWarehouse, 10)
            .await
            .unwrap();
        let box_id = boxes[&key];

        let items: Vec<NewStockItem> = ["356307042441013", "356307042441021", "356307042441039"]
            .iter()
            .map(|imei| NewStockItem {
                identifier: imei.to_string(),
                box_id,
            })
            .collect();
        let inserted = insert_items(&db, &items, StockLocation::MainWarehouse, Uuid::new_v4(), 2)
            .await
            .unwrap();
        assert_eq!(inserted, 3);

        let probe = vec![
            "356307042441039".to_string(),
            "356307042441013".to_string(),
            "111111111111111".to_string(),
            "356307042441013".to_string(),
        ];
        let existing = find_existing_identifiers(&db, &probe, 2).await.unwrap();
        assert_eq!(existing, vec!["356307042441013", "356307042441039"]);

        let listed = list_identifiers_by_box(&db, box_id.value()).await.unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(listed[0], "356307042441013");
    }

    #[tokio::test]
    async fn test_insert_nothing_is_a_no_op() {
        let db = connect_in_memory().await;
        let inserted = insert_items(&db, &[], StockLocation::Transit, Uuid::new_v4(), 100)
            .await
            .unwrap();
        assert_eq!(inserted, 0);
        assert!(find_existing_identifiers(&db, &[], 100).await.unwrap().is_empty());
    }
}
