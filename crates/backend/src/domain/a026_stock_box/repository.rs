use chrono::{DateTime, Utc};
use contracts::domain::a026_stock_box::{BoxKey, StockBox, StockBoxId};
use contracts::domain::common::AggregateId;
use contracts::enums::StockLocation;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a026_stock_box")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub device: String,
    pub box_no: String,
    pub location: String,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for StockBox {
    fn from(m: Model) -> Self {
        let id = box_id_of(&m);
        let location = StockLocation::from_code(&m.location).unwrap_or_else(|| {
            tracing::warn!("Box {} has unknown location '{}'", m.id, m.location);
            StockLocation::MainWarehouse
        });
        let created_at = DateTime::parse_from_rfc3339(&m.created_at)
            .map(|d| d.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());
        StockBox {
            id,
            device: m.device,
            box_no: m.box_no,
            location,
            created_at,
        }
    }
}

fn box_id_of(m: &Model) -> StockBoxId {
    StockBoxId::from_string(&m.id).unwrap_or_else(|e| {
        tracing::warn!("Box row has malformed id: {}", e);
        StockBoxId::new(Uuid::nil())
    })
}

pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<StockBox>, DbErr> {
    let result = Entity::find_by_id(id.to_string()).one(db).await?;
    Ok(result.map(Into::into))
}

/// Найти существующие коробки по адресам (device, box_no)
///
/// Запросы идут по одному устройству, номера коробок - пачками по `batch_size`.
pub async fn find_boxes<C: ConnectionTrait>(
    db: &C,
    keys: &[BoxKey],
    batch_size: usize,
) -> Result<HashMap<BoxKey, StockBoxId>, DbErr> {
    let mut by_device: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for key in keys {
        by_device
            .entry(key.device.as_str())
            .or_default()
            .insert(key.box_no.as_str());
    }

    let mut found = HashMap::new();
    for (device, box_nos) in by_device {
        let box_nos: Vec<&str> = box_nos.into_iter().collect();
        for chunk in box_nos.chunks(batch_size.max(1)) {
            let rows = Entity::find()
                .filter(Column::Device.eq(device))
                .filter(Column::BoxNo.is_in(chunk.iter().copied()))
                .all(db)
                .await?;
            for row in rows {
                let id = box_id_of(&row);
                found.insert(BoxKey::new(row.device, row.box_no), id);
            }
        }
    }
    Ok(found)
}

/// Создать недостающие коробки и вернуть id для всех запрошенных адресов
///
/// Новые коробки вставляются пачкой, затем их id перечитываются из хранилища.
pub async fn find_or_create_boxes<C: ConnectionTrait>(
    db: &C,
    keys: &[BoxKey],
    location: StockLocation,
    batch_size: usize,
) -> Result<HashMap<BoxKey, StockBoxId>, DbErr> {
    let mut resolved = find_boxes(db, keys, batch_size).await?;
    let missing: Vec<BoxKey> = keys
        .iter()
        .filter(|key| !resolved.contains_key(*key))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if missing.is_empty() {
        return Ok(resolved);
    }

    let created_at = Utc::now().to_rfc3339();
    for chunk in missing.chunks(batch_size.max(1)) {
        let models = chunk.iter().map(|key| ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            device: Set(key.device.clone()),
            box_no: Set(key.box_no.clone()),
            location: Set(location.code().to_string()),
            created_at: Set(created_at.clone()),
        });
        Entity::insert_many(models).exec_without_returning(db).await?;
    }

    let created = find_boxes(db, &missing, batch_size).await?;
    if created.len() != missing.len() {
        return Err(DbErr::Custom(format!(
            "created {} boxes but re-read {}",
            missing.len(),
            created.len()
        )));
    }
    tracing::debug!("Created {} boxes at {}", created.len(), location);
    resolved.extend(created);
    Ok(resolved)
}
