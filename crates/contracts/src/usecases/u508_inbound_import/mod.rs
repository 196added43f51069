pub mod issues;
pub mod response;

pub use issues::{RowIssue, RowIssueKind};
pub use response::{
    BoxLabel, ImportCounts, ImportFailureReason, InboundImportFailure, InboundImportResponse,
    InboundPreviewResponse, PlannedBox,
};

use crate::usecases::common::UseCaseMetadata;

pub struct InboundImport;

impl UseCaseMetadata for InboundImport {
    fn usecase_index() -> &'static str {
        "u508"
    }

    fn usecase_name() -> &'static str {
        "inbound_import"
    }

    fn display_name() -> &'static str {
        "Приёмка товара из файла поставщика"
    }

    fn description() -> &'static str {
        "Разбор файла поставщика, сверка IMEI с хранилищем и атомарная приёмка коробок с печатью этикеток"
    }
}
