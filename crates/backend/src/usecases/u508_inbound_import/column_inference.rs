use std::ops::Range;

use super::box_code::looks_like_box_code;
use super::identifier::is_strict_identifier;
use super::tabular_reader::RawGrid;

/// Колонки плоской таблицы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InferredColumns {
    pub device_col: usize,
    pub box_col: usize,
    pub identifier_col: usize,
    /// Колонки не определились по данным, взяты 0/1/2
    pub fallback: bool,
}

/// Количество значений колонки, удовлетворяющих признаку
pub fn score_column(
    grid: &RawGrid,
    rows: Range<usize>,
    col: usize,
    predicate: impl Fn(&str) -> bool,
) -> usize {
    rows.filter(|&row| predicate(&grid.text(row, col))).count()
}

/// Колонка с максимальным положительным счётом; при равенстве - с меньшим индексом
pub fn best_column(
    grid: &RawGrid,
    rows: Range<usize>,
    excluded: &[usize],
    predicate: impl Fn(&str) -> bool,
) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for col in 0..grid.width() {
        if excluded.contains(&col) {
            continue;
        }
        let score = score_column(grid, rows.clone(), col, &predicate);
        if score > 0 && best.map_or(true, |(_, top)| score > top) {
            best = Some((col, score));
        }
    }
    best.map(|(col, _)| col)
}

fn has_alphabetic(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

/// Определить колонки IMEI, коробки и устройства по выборке строк под заголовком
///
/// Найденные по данным колонки сохраняются; недостающие берутся из свободных
/// позиций 0/1/2 (устройство, коробка, IMEI). `None`, если под заголовком нет
/// строк или для недостающих колонок не хватает ширины таблицы.
pub fn infer_columns(
    grid: &RawGrid,
    header_row: usize,
    sample_rows: usize,
) -> Option<InferredColumns> {
    let first = header_row + 1;
    let last = (first + sample_rows).min(grid.height());
    if first >= last {
        return None;
    }
    let sample = first..last;

    let identifier_col = best_column(grid, sample.clone(), &[], is_strict_identifier);
    let taken: Vec<usize> = identifier_col.into_iter().collect();
    let box_col = best_column(grid, sample.clone(), &taken, looks_like_box_code);
    let taken: Vec<usize> = identifier_col.into_iter().chain(box_col).collect();
    let device_col = best_column(grid, sample, &taken, has_alphabetic);

    let mut roles = [device_col, box_col, identifier_col];
    let fallback = roles.iter().any(Option::is_none);
    for default in 0..roles.len() {
        if roles[default].is_some() {
            continue;
        }
        let free = (0..3)
            .filter(|&col| col < grid.width())
            .find(|col| !roles.contains(&Some(*col)))?;
        roles[default] = Some(if roles.contains(&Some(default)) || default >= grid.width() {
            free
        } else {
            default
        });
    }

    let [Some(device_col), Some(box_col), Some(identifier_col)] = roles else {
        return None;
    };
    Some(InferredColumns {
        device_col,
        box_col,
        identifier_col,
        fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_inferred_from_values_not_position() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["IMEI", "Qty", "Model", "Box"],
            vec!["356307042441013", "1", "FMB140", "12-01"],
            vec!["356307042441021", "1", "FMB140", "12-01"],
            vec!["356307042441039", "1", "FMC130", "12-02"],
        ]);
        let inferred = infer_columns(&grid, 0, 60).unwrap();
        assert_eq!(inferred.identifier_col, 0);
        assert_eq!(inferred.box_col, 3);
        assert_eq!(inferred.device_col, 2);
        assert!(!inferred.fallback);
    }

    #[test]
    fn test_ties_go_to_lowest_column() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["Box", "Box 2", "IMEI", "Name", "Comment"],
            vec!["0042", "0043", "356307042441013", "FMB140", "ok"],
        ]);
        let inferred = infer_columns(&grid, 0, 60).unwrap();
        assert_eq!(inferred.box_col, 0);
        assert_eq!(inferred.device_col, 3);
    }

    #[test]
    fn test_sample_window_is_bounded() {
        let mut rows = vec![vec!["IMEI", "Serial", "Model"]];
        rows.push(vec!["356307042441013", "", "FMB140"]);
        for _ in 0..5 {
            rows.push(vec!["", "356307042441013", "FMB140"]);
        }
        let grid = RawGrid::from_text_rows(rows);
        assert_eq!(best_column(&grid, 1..2, &[], is_strict_identifier), Some(0));
        assert_eq!(best_column(&grid, 1..7, &[], is_strict_identifier), Some(1));
    }

    #[test]
    fn test_undetermined_columns_fall_back_to_first_three() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["Box", "IMEI", "Device"],
            vec!["???", "--", "#1"],
        ]);
        let inferred = infer_columns(&grid, 0, 60).unwrap();
        assert!(inferred.fallback);
        assert_eq!(
            (inferred.device_col, inferred.box_col, inferred.identifier_col),
            (0, 1, 2)
        );
    }

    #[test]
    fn test_compound_master_codes_mark_the_box_column() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["Model", "IMEI", "Master box"],
            vec!["FMB140", "356307042441013", "FMB140BTZ9FD-076-004"],
            vec!["FMB140", "356307042441021", "FMB140BTZ9FD-076-004"],
        ]);
        let inferred = infer_columns(&grid, 0, 60).unwrap();
        assert_eq!(
            (inferred.device_col, inferred.box_col, inferred.identifier_col),
            (0, 2, 1)
        );
        assert!(!inferred.fallback);
    }

    #[test]
    fn test_fallback_keeps_columns_found_in_data() {
        let grid = RawGrid::from_text_rows(vec![
            vec!["IMEI", "Box", "Model"],
            vec!["356307042441013", "???", "FMB140"],
            vec!["356307042441021", "???", "FMB140"],
        ]);
        let inferred = infer_columns(&grid, 0, 60).unwrap();
        assert!(inferred.fallback);
        assert_eq!(inferred.identifier_col, 0);
        assert_eq!(inferred.device_col, 2);
        assert_eq!(inferred.box_col, 1);
    }

    #[test]
    fn test_no_rows_below_header() {
        let grid = RawGrid::from_text_rows(vec![vec!["Box", "IMEI", "Device"]]);
        assert_eq!(infer_columns(&grid, 0, 60), None);

        let narrow = RawGrid::from_text_rows(vec![vec!["Box", "IMEI"], vec!["x", "y"]]);
        assert_eq!(infer_columns(&narrow, 0, 60), None);
    }
}
