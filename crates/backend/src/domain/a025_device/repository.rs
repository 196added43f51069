use chrono::Utc;
use contracts::domain::a025_device::{DeviceCatalogEntry, DeviceId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use sea_orm::{EntityTrait, QueryOrder, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a025_device")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub canonical_key: String,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DeviceCatalogEntry {
    fn from(m: Model) -> Self {
        let uuid = Uuid::parse_str(&m.id).unwrap_or_else(|_| Uuid::new_v4());
        DeviceCatalogEntry {
            id: DeviceId::new(uuid),
            canonical_key: m.canonical_key,
            display_name: m.display_name,
            active: m.is_active,
        }
    }
}

/// Весь справочник устройств, упорядоченный по ключу
///
/// Порядок важен: при равном счёте сопоставления побеждает запись, встретившаяся первой.
pub async fn load_catalog<C: ConnectionTrait>(db: &C) -> Result<Vec<DeviceCatalogEntry>, DbErr> {
    let items = Entity::find()
        .order_by_asc(Column::CanonicalKey)
        .order_by_asc(Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

/// Создать или обновить элемент справочника по id
pub async fn upsert<C: ConnectionTrait>(db: &C, entry: &DeviceCatalogEntry) -> Result<(), DbErr> {
    let now = Utc::now();
    let active = ActiveModel {
        id: Set(entry.id.value().to_string()),
        canonical_key: Set(entry.canonical_key.trim().to_string()),
        display_name: Set(entry.display_name.trim().to_string()),
        is_active: Set(entry.active),
        created_at: Set(Some(now)),
        updated_at: Set(Some(now)),
    };
    Entity::insert(active)
        .on_conflict(
            OnConflict::column(Column::Id)
                .update_columns([
                    Column::CanonicalKey,
                    Column::DisplayName,
                    Column::IsActive,
                    Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}
