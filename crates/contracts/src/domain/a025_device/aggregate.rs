use crate::domain::common::AggregateId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// ID типа для справочника устройств
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(pub Uuid);

impl DeviceId {
    pub fn new(value: Uuid) -> Self {
        Self(value)
    }
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl AggregateId for DeviceId {
    fn as_string(&self) -> String {
        self.0.to_string()
    }
    fn from_string(s: &str) -> Result<Self, String> {
        Uuid::parse_str(s)
            .map(DeviceId::new)
            .map_err(|e| format!("Invalid UUID: {}", e))
    }
}

/// Элемент справочника устройств (агрегат a025)
///
/// Справочник загружается только для чтения на время одного импорта.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCatalogEntry {
    pub id: DeviceId,

    /// Ключ сопоставления (напр. "FMB140"); нормализуется при сравнении
    #[serde(rename = "canonicalKey")]
    pub canonical_key: String,

    /// Отображаемое имя, которое попадает в коробки и этикетки
    #[serde(rename = "displayName")]
    pub display_name: String,

    /// Неактивные устройства не участвуют в сопоставлении
    pub active: bool,
}

impl DeviceCatalogEntry {
    pub fn new(canonical_key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: DeviceId::new(Uuid::new_v4()),
            canonical_key: canonical_key.into(),
            display_name: display_name.into(),
            active: true,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.canonical_key.trim().is_empty() {
            return Err("Canonical key must not be empty".into());
        }
        if self.display_name.trim().is_empty() {
            return Err("Display name must not be empty".into());
        }
        Ok(())
    }
}
