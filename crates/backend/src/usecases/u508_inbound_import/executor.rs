use contracts::enums::StockLocation;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u508_inbound_import::{
    InboundImport, InboundImportResponse, InboundPreviewResponse, RowIssue,
};
use sea_orm::DatabaseConnection;

use super::commit_executor::{self, CommitContext};
use super::error::ImportError;
use super::label_emitter;
use super::parser::{self, ParseOutcome};
use super::reconciliation;
use super::tabular_reader;
use crate::domain::a025_device;
use crate::shared::config::InboundImportSettings;

/// Executor для UseCase приёмки товара из файла поставщика
pub struct InboundImportExecutor<'a> {
    db: &'a DatabaseConnection,
    settings: &'a InboundImportSettings,
}

impl<'a> InboundImportExecutor<'a> {
    pub fn new(db: &'a DatabaseConnection, settings: &'a InboundImportSettings) -> Self {
        Self { db, settings }
    }

    /// Чтение файла и разбор строк; справочник устройств читается здесь же
    async fn parse(&self, file_name: &str, bytes: &[u8]) -> Result<ParseOutcome, ImportError> {
        let grid = tabular_reader::read_grid(file_name, bytes)?;
        tracing::debug!(
            "Read {} rows x {} columns from {}",
            grid.height(),
            grid.width(),
            file_name
        );
        let catalog = a025_device::repository::load_catalog(self.db).await?;
        parser::parse_grid(&grid, &catalog, self.settings)
    }

    fn bounded_issues(&self, issues: &[RowIssue]) -> Vec<RowIssue> {
        issues
            .iter()
            .take(self.settings.issue_preview_limit)
            .cloned()
            .collect()
    }

    /// Разбор и сверка без записи в хранилище
    pub async fn preview(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<InboundPreviewResponse, ImportError> {
        tracing::info!(
            "[{}] preview of {} ({} bytes)",
            InboundImport::full_name(),
            file_name,
            bytes.len()
        );
        let outcome = self.parse(file_name, bytes).await?;
        let groups = reconciliation::group_rows(&outcome.rows);
        let conflicts = reconciliation::find_conflicts(self.db, &groups, self.settings).await?;
        let plan = reconciliation::plan(self.db, groups, self.settings).await?;

        Ok(InboundPreviewResponse {
            status: "ok".to_string(),
            file_name: file_name.to_string(),
            header_row: outcome.header_row + 1,
            layout_mode: outcome.mode.code().to_string(),
            counts: plan.counts(),
            boxes: plan.planned_boxes(),
            conflicts_total: conflicts.len(),
            conflicts: conflicts
                .into_iter()
                .take(self.settings.conflict_preview_limit)
                .collect(),
            issues: self.bounded_issues(&outcome.issues),
            issues_total: outcome.issues.len(),
        })
    }

    /// Полная приёмка: разбор, сверка, транзакционная запись, этикетки
    pub async fn execute(
        &self,
        file_name: &str,
        bytes: &[u8],
        location: StockLocation,
        actor: &str,
    ) -> Result<InboundImportResponse, ImportError> {
        tracing::info!(
            "[{}] {} ({} bytes) to {} by {}",
            InboundImport::full_name(),
            file_name,
            bytes.len(),
            location,
            actor
        );
        let outcome = self.parse(file_name, bytes).await?;
        let groups = reconciliation::group_rows(&outcome.rows);
        let plan = reconciliation::reconcile(self.db, groups, self.settings).await?;

        let ctx = CommitContext {
            file_name,
            location,
            actor,
        };
        let summary = commit_executor::commit(self.db, &plan, &ctx, self.settings)
            .await
            .map_err(|e| {
                if let ImportError::Store(message) = &e {
                    tracing::error!("Inbound import of {} failed: {}", file_name, message);
                }
                e
            })?;

        Ok(InboundImportResponse {
            status: "ok".to_string(),
            import_id: summary.import_id.to_string(),
            file_name: file_name.to_string(),
            location,
            counts: summary.counts,
            labels: label_emitter::build_labels(&plan.groups),
            issues: self.bounded_issues(&outcome.issues),
            issues_total: outcome.issues.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{a026_stock_box, a027_stock_item};
    use crate::shared::data::db::connect_in_memory;
    use contracts::domain::a025_device::DeviceCatalogEntry;
    use contracts::domain::a026_stock_box::BoxKey;
    use contracts::usecases::u508_inbound_import::RowIssueKind;
    use uuid::Uuid;

    const ID1: &str = "356307042441013";
    const ID2: &str = "356307042441021";
    const ID3: &str = "356307042441039";

    fn vendor_csv(ids: [&str; 3]) -> Vec<u8> {
        format!(
            "FMB140,\nBox No.,IMEI\nFMB140BTZ9FD-076-004,{}\n,{}\n,{}\n",
            ids[0], ids[1], ids[2]
        )
        .into_bytes()
    }

    async fn seeded_db() -> DatabaseConnection {
        let db = connect_in_memory().await;
        a025_device::repository::upsert(&db, &DeviceCatalogEntry::new("FMB140", "FMB140 BT"))
            .await
            .unwrap();
        db
    }

    #[tokio::test]
    async fn test_vendor_file_becomes_one_box() {
        let db = seeded_db().await;
        let settings = InboundImportSettings::default();
        let executor = InboundImportExecutor::new(&db, &settings);

        let response = executor
            .execute(
                "vendor.csv",
                &vendor_csv([ID1, ID2, ID3]),
                StockLocation::MainWarehouse,
                "admin",
            )
            .await
            .unwrap();

        assert_eq!(response.counts.devices, 1);
        assert_eq!(response.counts.boxes, 1);
        assert_eq!(response.counts.new_boxes, 1);
        assert_eq!(response.counts.items, 3);
        assert_eq!(response.labels.len(), 1);
        let label = &response.labels[0];
        assert_eq!(label.device, "FMB140 BT");
        assert_eq!(label.box_no, "076-004");
        assert_eq!(label.qr_payload, format!("{}\n{}\n{}", ID1, ID2, ID3));

        let boxes = a026_stock_box::repository::find_boxes(
            &db,
            &[BoxKey::new("FMB140 BT", "076-004")],
            500,
        )
        .await
        .unwrap();
        assert_eq!(boxes.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_row_is_reported_and_skipped() {
        let db = seeded_db().await;
        let settings = InboundImportSettings::default();
        let executor = InboundImportExecutor::new(&db, &settings);

        let response = executor
            .execute(
                "vendor.csv",
                &vendor_csv([ID1, ID1, ID3]),
                StockLocation::Showroom,
                "admin",
            )
            .await
            .unwrap();

        assert_eq!(response.counts.items, 2);
        assert_eq!(response.labels[0].quantity, 2);
        assert_eq!(response.issues_total, 1);
        assert_eq!(response.issues[0].kind, RowIssueKind::DuplicateInFile);
        assert_eq!(response.issues[0].row, 4);
    }

    #[tokio::test]
    async fn test_existing_identifier_rejects_import_without_mutation() {
        let db = seeded_db().await;
        let settings = InboundImportSettings::default();
        let executor = InboundImportExecutor::new(&db, &settings);

        let key = BoxKey::new("FMB140 BT", "001-001");
        let boxes = a026_stock_box::repository::find_or_create_boxes(
            &db,
            &[key.clone()],
            StockLocation::MainWarehouse,
            500,
        )
        .await
        .unwrap();
        a027_stock_item::repository::insert_items(
            &db,
            &[a027_stock_item::repository::NewStockItem {
                identifier: ID3.to_string(),
                box_id: boxes[&key],
            }],
            StockLocation::MainWarehouse,
            Uuid::new_v4(),
            1000,
        )
        .await
        .unwrap();

        let err = executor
            .execute(
                "vendor.csv",
                &vendor_csv([ID1, ID2, ID3]),
                StockLocation::MainWarehouse,
                "admin",
            )
            .await
            .unwrap_err();
        match &err {
            ImportError::Conflict { preview, total } => {
                assert_eq!(preview, &vec![ID3.to_string()]);
                assert_eq!(*total, 1);
            }
            other => panic!("expected conflict, got {:?}", other),
        }

        let untouched = a026_stock_box::repository::find_boxes(
            &db,
            &[BoxKey::new("FMB140 BT", "076-004")],
            500,
        )
        .await
        .unwrap();
        assert!(untouched.is_empty());
        let stored = a027_stock_item::repository::find_existing_identifiers(
            &db,
            &[ID1.to_string(), ID2.to_string()],
            500,
        )
        .await
        .unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn test_preview_reports_plan_and_conflicts_without_writing() {
        let db = seeded_db().await;
        let settings = InboundImportSettings::default();
        let executor = InboundImportExecutor::new(&db, &settings);
        executor
            .execute(
                "first.csv",
                &vendor_csv([ID1, ID2, ID3]),
                StockLocation::MainWarehouse,
                "admin",
            )
            .await
            .unwrap();

        let preview = executor
            .preview("again.csv", &vendor_csv([ID1, ID2, ID3]))
            .await
            .unwrap();
        assert_eq!(preview.header_row, 2);
        assert_eq!(preview.layout_mode, "blocks");
        assert_eq!(preview.conflicts_total, 3);
        assert_eq!(preview.boxes.len(), 1);
        assert!(!preview.boxes[0].is_new);

        let audit = crate::domain::a028_inbound_import::repository::list_recent(&db, 10)
            .await
            .unwrap();
        assert_eq!(audit.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_device_everywhere_is_no_valid_rows() {
        let db = connect_in_memory().await;
        let settings = InboundImportSettings::default();
        let executor = InboundImportExecutor::new(&db, &settings);

        let err = executor
            .execute(
                "vendor.csv",
                &vendor_csv([ID1, ID2, ID3]),
                StockLocation::Transit,
                "admin",
            )
            .await
            .unwrap_err();
        let ImportError::NoValidRows { issues } = err else {
            panic!("expected no valid rows");
        };
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.kind == RowIssueKind::DeviceNotRecognized));
    }
}
