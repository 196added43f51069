use serde::{Deserialize, Serialize};

use super::issues::RowIssue;
use crate::enums::StockLocation;

/// Итоговые количества по импорту
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCounts {
    /// Различных устройств
    pub devices: usize,
    /// Коробок (новых и существующих)
    pub boxes: usize,
    /// Из них новых коробок
    #[serde(rename = "newBoxes")]
    pub new_boxes: usize,
    /// Принятых IMEI
    pub items: usize,
}

/// Этикетка на коробку
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxLabel {
    pub device: String,

    #[serde(rename = "boxNo")]
    pub box_no: String,

    pub quantity: usize,

    /// Содержимое 2D-кода: по одному IMEI на строку, отсортировано
    #[serde(rename = "qrPayload")]
    pub qr_payload: String,

    /// Разметка для принтера этикеток (ZPL)
    #[serde(rename = "printerMarkup")]
    pub printer_markup: String,
}

/// Ответ успешной приёмки
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundImportResponse {
    pub status: String,

    #[serde(rename = "importId")]
    pub import_id: String,

    #[serde(rename = "fileName")]
    pub file_name: String,

    pub location: StockLocation,

    pub counts: ImportCounts,

    pub labels: Vec<BoxLabel>,

    /// Проблемные строки (не более лимита из настроек)
    pub issues: Vec<RowIssue>,

    /// Общее количество проблемных строк
    #[serde(rename = "issuesTotal")]
    pub issues_total: usize,
}

/// Коробка в плане приёмки (предпросмотр)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedBox {
    pub device: String,

    #[serde(rename = "boxNo")]
    pub box_no: String,

    pub quantity: usize,

    /// true - коробка будет создана, false - IMEI добавятся в существующую
    #[serde(rename = "isNew")]
    pub is_new: bool,
}

/// Ответ предпросмотра: разбор и сверка без записи в хранилище
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundPreviewResponse {
    pub status: String,

    #[serde(rename = "fileName")]
    pub file_name: String,

    /// Строка заголовка (с 1)
    #[serde(rename = "headerRow")]
    pub header_row: usize,

    /// "blocks" - повторяющиеся блоки поставщика, "inferred" - плоская таблица
    #[serde(rename = "layoutMode")]
    pub layout_mode: String,

    pub counts: ImportCounts,

    pub boxes: Vec<PlannedBox>,

    /// IMEI, уже существующие в хранилище (не более лимита)
    pub conflicts: Vec<String>,

    #[serde(rename = "conflictsTotal")]
    pub conflicts_total: usize,

    pub issues: Vec<RowIssue>,

    #[serde(rename = "issuesTotal")]
    pub issues_total: usize,
}

/// Машиночитаемая причина отказа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportFailureReason {
    UnreadableFile,
    EmptySheet,
    HeaderNotFound,
    NoColumnGroups,
    NoValidRows,
    IdentifierConflict,
    InvalidLocation,
    MissingField,
    StoreFailure,
}

/// Тело ответа при отказе в приёмке
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundImportFailure {
    pub status: String,

    pub reason: ImportFailureReason,

    pub message: String,

    /// Проблемные значения (напр. конфликтующие IMEI), не более лимита
    #[serde(default)]
    pub offending: Vec<String>,

    #[serde(default)]
    pub issues: Vec<RowIssue>,
}
