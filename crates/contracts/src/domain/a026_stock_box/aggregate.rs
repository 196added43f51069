use crate::domain::common::AggregateId;
use crate::enums::StockLocation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для коробки на складе
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockBoxId(pub Uuid);

impl StockBoxId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for StockBoxId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(StockBoxId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Коробка с устройствами (агрегат a026)
///
/// Адресуется парой (device, box_no); пара уникальна в хранилище.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockBox {
    pub id: StockBoxId,

    /// Отображаемое имя устройства из справочника a025
    pub device: String,

    /// Номер коробки (напр. "076-004")
    #[serde(rename = "boxNo")]
    pub box_no: String,

    /// Склад, на который коробка была принята
    pub location: StockLocation,

    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Адрес коробки: устройство + номер коробки
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoxKey {
    pub device: String,
    #[serde(rename = "boxNo")]
    pub box_no: String,
}

impl BoxKey {
    pub fn new(device: impl Into<String>, box_no: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            box_no: box_no.into(),
        }
    }
}

impl std::fmt::Display for BoxKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.device, self.box_no)
    }
}
