use contracts::domain::a025_device::DeviceCatalogEntry;
use contracts::usecases::u508_inbound_import::{RowIssue, RowIssueKind};
use std::collections::HashMap;

use super::box_code::{extract_box_code, normalize_flat_box};
use super::column_inference::{infer_columns, InferredColumns};
use super::device_resolver::DeviceResolver;
use super::error::ImportError;
use super::identifier::{self, BatchDeduplicator};
use super::layout_detector::{carry_forward, detect_groups, find_header_row, ColumnGroup};
use super::tabular_reader::RawGrid;
use crate::shared::config::InboundImportSettings;

/// Строка файла, прошедшая все проверки
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// Индекс строки в таблице (с 0)
    pub row_index: usize,
    pub device_raw: String,
    /// Отображаемое имя устройства из справочника
    pub device_resolved: Option<String>,
    pub box_no: String,
    pub identifier: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutMode {
    /// Повторяющиеся блоки поставщика с подписью устройства над заголовком
    Blocks,
    /// Плоская таблица, колонки определены по данным
    Inferred,
}

impl LayoutMode {
    pub fn code(&self) -> &'static str {
        match self {
            LayoutMode::Blocks => "blocks",
            LayoutMode::Inferred => "inferred",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// Индекс строки заголовка (с 0)
    pub header_row: usize,
    pub mode: LayoutMode,
    pub group_count: usize,
    pub rows: Vec<ParsedRow>,
    pub issues: Vec<RowIssue>,
}

/// Как из ячейки коробки получается номер
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoxNormalization {
    Extract,
    FlatShape,
}

/// Непроверенная строка данных
struct Candidate {
    row_index: usize,
    device_raw: String,
    box_text: Option<String>,
    identifier_raw: String,
}

/// Проверки строки: IMEI, устройство, коробка, повтор в файле
struct RowValidator<'a> {
    resolver: DeviceResolver<'a>,
    resolved: HashMap<String, Option<String>>,
    dedup: BatchDeduplicator,
    normalization: BoxNormalization,
}

impl<'a> RowValidator<'a> {
    fn new(resolver: DeviceResolver<'a>, normalization: BoxNormalization) -> Self {
        Self {
            resolver,
            resolved: HashMap::new(),
            dedup: BatchDeduplicator::new(),
            normalization,
        }
    }

    fn resolve_device(&mut self, raw: &str) -> Option<String> {
        if let Some(cached) = self.resolved.get(raw) {
            return cached.clone();
        }
        let resolved = self.resolver.resolve(raw).map(|hit| {
            tracing::debug!(
                "Device '{}' -> {} ({} rule, score {})",
                raw,
                hit.entry.canonical_key,
                hit.rule.name(),
                hit.score
            );
            hit.entry.display_name.clone()
        });
        self.resolved.insert(raw.to_string(), resolved.clone());
        resolved
    }

    fn validate(&mut self, candidate: Candidate) -> Result<ParsedRow, RowIssue> {
        let row = candidate.row_index + 1;

        let Some(identifier) = identifier::validate(&candidate.identifier_raw) else {
            return Err(RowIssue::new(
                row,
                RowIssueKind::InvalidIdentifier,
                candidate.identifier_raw,
            ));
        };

        let Some(device) = self.resolve_device(&candidate.device_raw) else {
            return Err(RowIssue::new(
                row,
                RowIssueKind::DeviceNotRecognized,
                candidate.device_raw,
            ));
        };

        let Some(box_text) = candidate.box_text.filter(|t| !t.trim().is_empty()) else {
            return Err(RowIssue::new(row, RowIssueKind::BoxCodeMissing, ""));
        };
        let box_no = match self.normalization {
            BoxNormalization::Extract => extract_box_code(&box_text),
            BoxNormalization::FlatShape => normalize_flat_box(&box_text),
        };
        let Some(box_no) = box_no else {
            return Err(RowIssue::new(row, RowIssueKind::BoxCodeUnextractable, box_text));
        };

        if let Err(first_row) = self.dedup.admit(&identifier, row) {
            return Err(RowIssue::new(row, RowIssueKind::DuplicateInFile, identifier)
                .with_detail(format!("first seen in row {}", first_row)));
        }

        Ok(ParsedRow {
            row_index: candidate.row_index,
            device_raw: candidate.device_raw,
            device_resolved: Some(device),
            box_no,
            identifier,
        })
    }
}

/// Разобрать таблицу в проверенные строки и список проблем
///
/// Структурные ошибки (нет заголовка, нет колонок) и отсутствие хотя бы одной
/// корректной строки - фатальны.
pub fn parse_grid(
    grid: &RawGrid,
    catalog: &[DeviceCatalogEntry],
    settings: &InboundImportSettings,
) -> Result<ParseOutcome, ImportError> {
    let header = find_header_row(grid, settings)?;
    let groups = detect_groups(grid, &header, settings);
    let resolver = DeviceResolver::new(catalog, &settings.scoring);

    let (mode, group_count, candidates, normalization) =
        if groups.iter().any(|g| g.device_hint.is_some()) {
            tracing::info!(
                "Header at row {}: {} column group(s) in block layout",
                header.row + 1,
                groups.len()
            );
            let candidates = block_candidates(grid, header.row, &groups);
            (LayoutMode::Blocks, groups.len(), candidates, BoxNormalization::Extract)
        } else {
            let inferred = infer_columns(grid, header.row, settings.inference_sample_rows)
                .ok_or(ImportError::NoColumnGroups {
                    header_row: header.row + 1,
                })?;
            tracing::info!(
                "Header at row {}: flat layout, device={} box={} identifier={} (fallback: {})",
                header.row + 1,
                inferred.device_col,
                inferred.box_col,
                inferred.identifier_col,
                inferred.fallback
            );
            let candidates = flat_candidates(grid, header.row, &inferred);
            (LayoutMode::Inferred, 1, candidates, BoxNormalization::FlatShape)
        };

    let mut validator = RowValidator::new(resolver, normalization);
    let mut rows = Vec::new();
    let mut issues = Vec::new();
    for candidate in candidates {
        match validator.validate(candidate) {
            Ok(row) => rows.push(row),
            Err(issue) => issues.push(issue),
        }
    }

    tracing::info!("Parsed {} valid row(s), {} issue(s)", rows.len(), issues.len());
    if rows.is_empty() {
        return Err(ImportError::NoValidRows { issues });
    }

    Ok(ParseOutcome {
        header_row: header.row,
        mode,
        group_count,
        rows,
        issues,
    })
}

/// Строки блоков в порядке строк таблицы, внутри строки - слева направо
fn block_candidates(grid: &RawGrid, header_row: usize, groups: &[ColumnGroup]) -> Vec<Candidate> {
    let data_rows = header_row + 1..grid.height();
    let masters: Vec<Vec<Option<String>>> = groups
        .iter()
        .map(|g| carry_forward(data_rows.clone().map(|row| grid.text(row, g.box_col))))
        .collect();

    let mut candidates = Vec::new();
    for (offset, row_index) in data_rows.enumerate() {
        for (group, carried) in groups.iter().zip(&masters) {
            let identifier_raw = grid.text(row_index, group.identifier_col);
            if identifier_raw.is_empty() {
                continue;
            }
            candidates.push(Candidate {
                row_index,
                device_raw: group.device_hint.clone().unwrap_or_default(),
                box_text: carried[offset].clone(),
                identifier_raw,
            });
        }
    }
    candidates
}

fn flat_candidates(grid: &RawGrid, header_row: usize, columns: &InferredColumns) -> Vec<Candidate> {
    (header_row + 1..grid.height())
        .filter_map(|row_index| {
            let identifier_raw = grid.text(row_index, columns.identifier_col);
            if identifier_raw.is_empty() {
                return None;
            }
            let box_text = grid.text(row_index, columns.box_col);
            Some(Candidate {
                row_index,
                device_raw: grid.text(row_index, columns.device_col),
                box_text: (!box_text.is_empty()).then_some(box_text),
                identifier_raw,
            })
        })
        .collect()
}
