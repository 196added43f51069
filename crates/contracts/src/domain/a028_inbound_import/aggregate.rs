use crate::domain::common::AggregateId;
use crate::enums::StockLocation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для записи журнала приёмки
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InboundImportId(pub Uuid);

impl InboundImportId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for InboundImportId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(InboundImportId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Запись журнала приёмки (агрегат a028): одна запись на успешный импорт файла
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundImportRecord {
    pub id: InboundImportId,

    #[serde(rename = "fileName")]
    pub file_name: String,

    pub location: StockLocation,

    /// Пользователь, выполнивший импорт
    pub actor: String,

    /// Количество различных устройств в файле
    #[serde(rename = "devicesCount")]
    pub devices_count: i64,

    /// Количество коробок, затронутых импортом
    #[serde(rename = "boxesCount")]
    pub boxes_count: i64,

    /// Из них создано новых
    #[serde(rename = "newBoxesCount")]
    pub new_boxes_count: i64,

    /// Количество принятых IMEI
    #[serde(rename = "itemsCount")]
    pub items_count: i64,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}
