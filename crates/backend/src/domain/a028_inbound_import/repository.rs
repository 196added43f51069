use chrono::{DateTime, SecondsFormat, Utc};
use contracts::domain::a028_inbound_import::{InboundImportId, InboundImportRecord};
use contracts::enums::StockLocation;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryOrder, QuerySelect, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a028_inbound_import")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub file_name: String,
    pub location: String,
    pub actor: String,
    pub devices_count: i64,
    pub boxes_count: i64,
    pub new_boxes_count: i64,
    pub items_count: i64,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for InboundImportRecord {
    fn from(m: Model) -> Self {
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        let created_at = DateTime::parse_from_rfc3339(&m.created_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        InboundImportRecord {
            id: InboundImportId::new(uuid),
            file_name: m.file_name,
            location: StockLocation::from_code(&m.location).unwrap_or(StockLocation::MainWarehouse),
            actor: m.actor,
            devices_count: m.devices_count,
            boxes_count: m.boxes_count,
            new_boxes_count: m.new_boxes_count,
            items_count: m.items_count,
            created_at,
        }
    }
}

pub async fn insert<C: ConnectionTrait>(db: &C, record: &InboundImportRecord) -> Result<(), DbErr> {
    let active = ActiveModel {
        id: Set(record.id.value().to_string()),
        file_name: Set(record.file_name.clone()),
        location: Set(record.location.code().to_string()),
        actor: Set(record.actor.clone()),
        devices_count: Set(record.devices_count),
        boxes_count: Set(record.boxes_count),
        new_boxes_count: Set(record.new_boxes_count),
        items_count: Set(record.items_count),
        created_at: Set(record
            .created_at
            .to_rfc3339_opts(SecondsFormat::Micros, true)),
    };
    Entity::insert(active).exec_without_returning(db).await?;
    Ok(())
}

/// Последние импорты, новые первыми
pub async fn list_recent<C: ConnectionTrait>(
    db: &C,
    limit: u64,
) -> Result<Vec<InboundImportRecord>, DbErr> {
    let items = Entity::find()
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use chrono::Duration;

    fn record(file_name: &str, created_at: DateTime<Utc>) -> InboundImportRecord {
        InboundImportRecord {
            id: InboundImportId::new(Uuid::new_v4()),
            file_name: file_name.to_string(),
            location: StockLocation::ServiceCenter,
            actor: "admin".to_string(),
            devices_count: 1,
            boxes_count: 2,
            new_boxes_count: 2,
            items_count: 40,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_list_recent_returns_newest_first() {
        let db = connect_in_memory().await;
        let now = Utc::now();
        insert(&db, &record("older.xlsx", now - Duration::hours(2))).await.unwrap();
        insert(&db, &record("newer.xlsx", now)).await.unwrap();

        let listed = list_recent(&db, 10).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].file_name, "newer.xlsx");
        assert_eq!(listed[0].location, StockLocation::ServiceCenter);
        assert_eq!(listed[1].items_count, 40);

        assert_eq!(list_recent(&db, 1).await.unwrap().len(), 1);
    }
}
