use contracts::domain::a026_stock_box::{BoxKey, StockBoxId};
use contracts::usecases::u508_inbound_import::{ImportCounts, PlannedBox};
use sea_orm::{ConnectionTrait, DbErr};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::error::ImportError;
use super::parser::ParsedRow;
use crate::domain::{a026_stock_box, a027_stock_item};
use crate::shared::config::InboundImportSettings;

/// Коробка с набором IMEI - единица приёмки
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxGroup {
    pub device: String,
    pub box_no: String,
    pub identifiers: BTreeSet<String>,
}

impl BoxGroup {
    pub fn key(&self) -> BoxKey {
        BoxKey::new(self.device.clone(), self.box_no.clone())
    }

    pub fn quantity(&self) -> usize {
        self.identifiers.len()
    }
}

/// Сгруппировать строки по (устройство, коробка); результат упорядочен по этой паре
pub fn group_rows(rows: &[ParsedRow]) -> Vec<BoxGroup> {
    let mut grouped: BTreeMap<(String, String), BTreeSet<String>> = BTreeMap::new();
    for row in rows {
        let Some(device) = &row.device_resolved else {
            continue;
        };
        grouped
            .entry((device.clone(), row.box_no.clone()))
            .or_default()
            .insert(row.identifier.clone());
    }
    grouped
        .into_iter()
        .map(|((device, box_no), identifiers)| BoxGroup {
            device,
            box_no,
            identifiers,
        })
        .collect()
}

/// IMEI к вставке; id коробки известен после создания недостающих коробок
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub identifier: String,
    pub box_key: BoxKey,
}

/// План приёмки, свободный от конфликтов на момент сверки
#[derive(Debug, Clone)]
pub struct CommitPlan {
    /// Все коробки файла в порядке (устройство, коробка)
    pub groups: Vec<BoxGroup>,
    pub new_boxes: Vec<BoxGroup>,
    pub existing_box_refs: HashMap<BoxKey, StockBoxId>,
    pub items_to_insert: Vec<PlannedItem>,
}

impl CommitPlan {
    pub fn box_keys(&self) -> Vec<BoxKey> {
        self.groups.iter().map(BoxGroup::key).collect()
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.items_to_insert
            .iter()
            .map(|item| item.identifier.clone())
            .collect()
    }

    pub fn counts(&self) -> ImportCounts {
        let devices: BTreeSet<&str> = self.groups.iter().map(|g| g.device.as_str()).collect();
        ImportCounts {
            devices: devices.len(),
            boxes: self.groups.len(),
            new_boxes: self.new_boxes.len(),
            items: self.items_to_insert.len(),
        }
    }

    pub fn planned_boxes(&self) -> Vec<PlannedBox> {
        self.groups
            .iter()
            .map(|g| PlannedBox {
                device: g.device.clone(),
                box_no: g.box_no.clone(),
                quantity: g.quantity(),
                is_new: !self.existing_box_refs.contains_key(&g.key()),
            })
            .collect()
    }
}

pub fn all_identifiers(groups: &[BoxGroup]) -> Vec<String> {
    groups
        .iter()
        .flat_map(|g| g.identifiers.iter().cloned())
        .collect()
}

/// IMEI из групп, уже существующие в хранилище (отсортированы)
pub async fn find_conflicts<C: ConnectionTrait>(
    db: &C,
    groups: &[BoxGroup],
    settings: &InboundImportSettings,
) -> Result<Vec<String>, DbErr> {
    a027_stock_item::repository::find_existing_identifiers(
        db,
        &all_identifiers(groups),
        settings.lookup_batch_size,
    )
    .await
}

/// Ошибка конфликта с ограниченным списком IMEI
pub fn conflict_error(conflicts: Vec<String>, preview_limit: usize) -> ImportError {
    let total = conflicts.len();
    let preview = conflicts.into_iter().take(preview_limit).collect();
    ImportError::Conflict { preview, total }
}

/// Разделить группы на новые и существующие коробки, без проверки конфликтов
pub async fn plan<C: ConnectionTrait>(
    db: &C,
    groups: Vec<BoxGroup>,
    settings: &InboundImportSettings,
) -> Result<CommitPlan, DbErr> {
    let keys: Vec<BoxKey> = groups.iter().map(BoxGroup::key).collect();
    let existing_box_refs =
        a026_stock_box::repository::find_boxes(db, &keys, settings.lookup_batch_size).await?;

    let new_boxes = groups
        .iter()
        .filter(|g| !existing_box_refs.contains_key(&g.key()))
        .cloned()
        .collect();

    let items_to_insert = groups
        .iter()
        .flat_map(|g| {
            let key = g.key();
            g.identifiers.iter().map(move |identifier| PlannedItem {
                identifier: identifier.clone(),
                box_key: key.clone(),
            })
        })
        .collect();

    Ok(CommitPlan {
        groups,
        new_boxes,
        existing_box_refs,
        items_to_insert,
    })
}

/// Сверка с хранилищем: любой уже существующий IMEI отклоняет весь файл
pub async fn reconcile<C: ConnectionTrait>(
    db: &C,
    groups: Vec<BoxGroup>,
    settings: &InboundImportSettings,
) -> Result<CommitPlan, ImportError> {
    let conflicts = find_conflicts(db, &groups, settings).await?;
    if !conflicts.is_empty() {
        tracing::warn!(
            "Import rejected: {} identifier(s) already in store",
            conflicts.len()
        );
        return Err(conflict_error(conflicts, settings.conflict_preview_limit));
    }
    Ok(plan(db, groups, settings).await?)
}
