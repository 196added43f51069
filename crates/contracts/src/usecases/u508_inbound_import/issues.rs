use serde::{Deserialize, Serialize};

/// Вид проблемы в строке файла; строка с проблемой не попадает в приёмку
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowIssueKind {
    /// Устройство не найдено в справочнике
    DeviceNotRecognized,
    /// В строке (и выше в блоке) нет номера мастер-коробки
    BoxCodeMissing,
    /// Из текста мастер-коробки не удалось выделить номер
    BoxCodeUnextractable,
    /// IMEI не состоит ровно из 15 цифр
    InvalidIdentifier,
    /// IMEI уже встречался выше в этом же файле
    DuplicateInFile,
}

/// Проблема в конкретной строке файла
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowIssue {
    /// Номер строки в таблице (с 1, как в Excel)
    pub row: usize,

    pub kind: RowIssueKind,

    /// Исходное значение ячейки, вызвавшее проблему
    pub value: String,

    /// Пояснение (напр. строка первого вхождения дубликата)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl RowIssue {
    pub fn new(row: usize, kind: RowIssueKind, value: impl Into<String>) -> Self {
        Self {
            row,
            kind,
            value: value.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}
