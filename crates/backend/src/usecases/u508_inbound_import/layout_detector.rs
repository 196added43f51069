use std::collections::HashSet;

use super::error::ImportError;
use super::tabular_reader::RawGrid;
use crate::shared::config::InboundImportSettings;

/// Роль ячейки строки заголовка
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderRole {
    Identifier,
    Box,
    Other,
}

fn header_role(text: &str, settings: &InboundImportSettings) -> HeaderRole {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return HeaderRole::Other;
    }
    let matches_any = |synonyms: &[String]| {
        synonyms
            .iter()
            .map(|s| s.trim().to_lowercase())
            .any(|s| !s.is_empty() && lower.contains(&s))
    };
    if matches_any(&settings.identifier_header_synonyms) {
        HeaderRole::Identifier
    } else if matches_any(&settings.box_header_synonyms) {
        HeaderRole::Box
    } else {
        HeaderRole::Other
    }
}

/// Найденная строка заголовка
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    /// Индекс строки (с 0)
    pub row: usize,
    pub identifier_cols: Vec<usize>,
    pub box_cols: Vec<usize>,
}

/// Первая из первых `header_scan_rows` строк, где есть и колонка IMEI, и колонка коробки
pub fn find_header_row(
    grid: &RawGrid,
    settings: &InboundImportSettings,
) -> Result<HeaderMatch, ImportError> {
    let scanned = settings.header_scan_rows.min(grid.height());
    let width = grid.width();

    for row in 0..scanned {
        let mut identifier_cols = Vec::new();
        let mut box_cols = Vec::new();
        for col in 0..width {
            match header_role(&grid.text(row, col), settings) {
                HeaderRole::Identifier => identifier_cols.push(col),
                HeaderRole::Box => box_cols.push(col),
                HeaderRole::Other => {}
            }
        }
        if !identifier_cols.is_empty() && !box_cols.is_empty() {
            return Ok(HeaderMatch {
                row,
                identifier_cols,
                box_cols,
            });
        }
    }

    Err(ImportError::HeaderNotFound {
        scanned: settings.header_scan_rows,
        identifier_synonyms: settings.identifier_header_synonyms.join(", "),
        box_synonyms: settings.box_header_synonyms.join(", "),
    })
}

/// Блок поставщика: колонка мастер-коробки, внутренней коробки и IMEI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnGroup {
    pub box_col: usize,
    /// Внутренняя коробка; в приёмке не участвует
    pub inner_col: Option<usize>,
    pub identifier_col: usize,
    /// Подпись устройства строкой выше заголовка
    pub device_hint: Option<String>,
}

/// Блоки по колонкам IMEI: для каждой ищутся колонки коробок левее, не дальше `block_scan_width`
pub fn detect_groups(
    grid: &RawGrid,
    header: &HeaderMatch,
    settings: &InboundImportSettings,
) -> Vec<ColumnGroup> {
    let mut seen = HashSet::new();
    let mut groups = Vec::new();

    for &identifier_col in &header.identifier_cols {
        let lowest = identifier_col.saturating_sub(settings.block_scan_width);
        // nearest first
        let mut nearby_boxes = Vec::new();
        for col in (lowest..identifier_col).rev() {
            if header.identifier_cols.contains(&col) {
                break;
            }
            if header.box_cols.contains(&col) {
                nearby_boxes.push(col);
                if nearby_boxes.len() == 2 {
                    break;
                }
            }
        }

        let (box_col, inner_col) = match nearby_boxes.as_slice() {
            [only] => (*only, None),
            [nearest, farther] => (*farther, Some(*nearest)),
            _ => continue,
        };

        if !seen.insert((box_col, identifier_col, inner_col)) {
            continue;
        }

        let device_hint = device_hint_for(grid, header.row, box_col, identifier_col);
        groups.push(ColumnGroup {
            box_col,
            inner_col,
            identifier_col,
            device_hint,
        });
    }

    groups
}

/// Подпись над блоком: сначала над мастер-коробкой, затем над остальными колонками блока
fn device_hint_for(
    grid: &RawGrid,
    header_row: usize,
    box_col: usize,
    identifier_col: usize,
) -> Option<String> {
    let hint_row = header_row.checked_sub(1)?;
    (box_col..=identifier_col)
        .map(|col| grid.text(hint_row, col))
        .find(|text| !text.is_empty())
}

/// Протягивание значения мастер-коробки вниз по пустым ячейкам блока
pub fn carry_forward<I, S>(values: I) -> Vec<Option<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .scan(None::<String>, |current, value| {
            let value = value.as_ref().trim();
            if !value.is_empty() {
                *current = Some(value.to_string());
            }
            Some(current.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> InboundImportSettings {
        InboundImportSettings::default()
    }

    #[test]
    fn test_header_found_within_scan_window() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["Supplier invoice", ""],
            vec!["FMB140", ""],
            vec!["Box No.", "IMEI"],
            vec!["FMB140BTZ9FD-076-004", "356307042441013"],
        ]);
        let header = find_header_row(&grid, &settings()).unwrap();
        assert_eq!(header.row, 2);
        assert_eq!(header.identifier_cols, vec![1]);
        assert_eq!(header.box_cols, vec![0]);
    }

    #[test]
    fn test_header_outside_window_is_not_found() {
        let mut rows: Vec<Vec<&str>> = vec![vec!["filler", ""]; 40];
        rows.push(vec!["Box", "IMEI"]);
        let grid = RawGrid::from_text_rows(rows);
        let err = find_header_row(&grid, &settings()).unwrap_err();
        assert!(matches!(err, ImportError::HeaderNotFound { scanned: 40, .. }));

        let only_identifier = RawGrid::from_text_rows(vec![vec!["Model", "IMEI"]]);
        assert!(find_header_row(&only_identifier, &settings()).is_err());
    }

    #[test]
    fn test_identifier_synonym_wins_over_box_synonym() {
        let grid = RawGrid::from_text_rows(vec![vec!["Carton", "IMEI in box"]]);
        let header = find_header_row(&grid, &settings()).unwrap();
        assert_eq!(header.identifier_cols, vec![1]);
        assert_eq!(header.box_cols, vec![0]);
    }

    #[test]
    fn test_side_by_side_blocks_with_inner_box() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["FMB140", "", "", "", "FMC130", "", ""],
            vec!["Master box", "Inner box", "IMEI", "", "Carton", "Qty", "Serial"],
        ]);
        let header = find_header_row(&grid, &settings()).unwrap();
        let groups = detect_groups(&grid, &header, &settings());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].box_col, 0);
        assert_eq!(groups[0].inner_col, Some(1));
        assert_eq!(groups[0].identifier_col, 2);
        assert_eq!(groups[0].device_hint.as_deref(), Some("FMB140"));

        assert_eq!(groups[1].box_col, 4);
        assert_eq!(groups[1].inner_col, None);
        assert_eq!(groups[1].identifier_col, 6);
        assert_eq!(groups[1].device_hint.as_deref(), Some("FMC130"));
    }

    #[test]
    fn test_scan_stops_at_previous_identifier_column() {
        let grid = RawGrid::from_text_rows(vec![vec!["Box", "IMEI", "IMEI 2"]]);
        let header = find_header_row(&grid, &settings()).unwrap();
        let groups = detect_groups(&grid, &header, &settings());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].identifier_col, 1);
        assert_eq!(groups[0].device_hint, None);
    }

    #[test]
    fn test_box_column_beyond_scan_width_is_ignored() {
        let mut header_row = vec!["Box"];
        header_row.extend(std::iter::repeat("").take(15));
        header_row.push("IMEI");
        let grid = RawGrid::from_text_rows(vec![header_row]);
        let header = find_header_row(&grid, &settings()).unwrap();
        assert!(detect_groups(&grid, &header, &settings()).is_empty());
    }

    #[test]
    fn test_device_hint_falls_back_to_other_block_columns() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["", "GH5200", ""],
            vec!["Box", "Qty", "IMEI"],
        ]);
        let header = find_header_row(&grid, &settings()).unwrap();
        let groups = detect_groups(&grid, &header, &settings());
        assert_eq!(groups[0].device_hint.as_deref(), Some("GH5200"));
    }

    #[test]
    fn test_carry_forward_inherits_last_non_blank() {
        let carried = carry_forward(["", "A-01", "", " ", "B-02", ""]);
        assert_eq!(
            carried,
            vec![
                None,
                Some("A-01".to_string()),
                Some("A-01".to_string()),
                Some("A-01".to_string()),
                Some("B-02".to_string()),
                Some("B-02".to_string()),
            ]
        );
    }
}
