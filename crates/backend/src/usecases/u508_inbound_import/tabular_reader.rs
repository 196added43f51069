use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;

use super::error::ImportError;

/// Значение ячейки без интерпретации
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Integer(i64),
}

impl Cell {
    /// Текст ячейки; целые числа из Excel (IMEI часто хранится числом) без ".0"
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Integer(v) => v.to_string(),
            Cell::Number(v) => {
                if v.fract() == 0.0 && v.abs() < 1e17 {
                    format!("{:.0}", v)
                } else {
                    v.to_string()
                }
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Таблица ячеек первого листа, построчно; индексы совпадают с координатами листа
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGrid {
    rows: Vec<Vec<Cell>>,
}

impl RawGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Таблица из строковых литералов ("" - пустая ячейка)
    pub fn from_text_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|s| Cell::from(s.as_ref())).collect())
            .collect();
        Self { rows }
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn text(&self, row: usize, col: usize) -> String {
        self.cell(row, col).text()
    }

    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .all(|row| row.iter().all(Cell::is_blank))
    }
}

/// Прочитать первый лист файла; формат выбирается по расширению имени
pub fn read_grid(file_name: &str, bytes: &[u8]) -> Result<RawGrid, ImportError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let grid = match extension.as_str() {
        "csv" => read_csv(bytes)?,
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook(bytes)?,
        other => {
            return Err(ImportError::Unreadable(format!(
                "unsupported file type '{}' (expected xlsx, xlsm, xls, xlsb, ods or csv)",
                other
            )))
        }
    };

    if grid.is_empty() {
        return Err(ImportError::EmptySheet);
    }
    Ok(grid)
}

fn read_workbook(bytes: &[u8]) -> Result<RawGrid, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Unreadable(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(Ok(range)) => range,
        Some(Err(e)) => return Err(ImportError::Unreadable(e.to_string())),
        None => return Err(ImportError::EmptySheet),
    };

    // used range may start below/right of A1
    let (row_offset, col_offset) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
    for source_row in range.rows() {
        let mut row = vec![Cell::Empty; col_offset];
        row.extend(source_row.iter().map(cell_from_data));
        rows.push(row);
    }
    Ok(RawGrid::new(rows))
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(v) => Cell::Integer(*v),
        Data::Float(v) => Cell::Number(*v),
        Data::Bool(v) => Cell::Text(v.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

fn read_csv(bytes: &[u8]) -> Result<RawGrid, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::Unreadable(e.to_string()))?;
        rows.push(record.iter().map(Cell::from).collect());
    }
    Ok(RawGrid::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_is_read_headerless_and_ragged() {
        let data = b"Device,Box,IMEI\nFMB140,12,356307042441013\nFMB140\n";
        let grid = read_grid("supplier.CSV", data).unwrap();
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.text(0, 2), "IMEI");
        assert_eq!(grid.text(1, 2), "356307042441013");
        assert!(grid.cell(2, 2).is_blank());
        assert!(grid.cell(99, 99).is_blank());
    }

    #[test]
    fn test_blank_csv_is_empty_sheet() {
        let err = read_grid("empty.csv", b",,\n,,\n").unwrap_err();
        assert!(matches!(err, ImportError::EmptySheet));
    }

    #[test]
    fn test_unknown_extension_is_unreadable() {
        let err = read_grid("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, ImportError::Unreadable(_)));
    }

    #[test]
    fn test_garbage_workbook_is_unreadable() {
        let err = read_grid("broken.xlsx", b"definitely not a zip").unwrap_err();
        assert!(matches!(err, ImportError::Unreadable(_)));
    }

    fn offset_workbook() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 2, "FMB140").unwrap();
        sheet.write_string(3, 2, "Box No.").unwrap();
        sheet.write_string(3, 3, "IMEI").unwrap();
        sheet.write_string(4, 2, "FMB140BTZ9FD-076-004").unwrap();
        sheet.write_number(4, 3, 356307042441013.0).unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_workbook_keeps_sheet_coordinates() {
        let grid = read_grid("vendor.xlsx", &offset_workbook()).unwrap();

        assert_eq!(grid.height(), 5);
        assert_eq!(grid.width(), 4);
        assert!(grid.cell(0, 0).is_blank());
        assert!(grid.cell(2, 1).is_blank());
        assert_eq!(grid.text(2, 2), "FMB140");
        assert_eq!(grid.text(3, 3), "IMEI");
        assert_eq!(grid.text(4, 2), "FMB140BTZ9FD-076-004");
    }

    #[test]
    fn test_workbook_numeric_identifier_has_no_fraction() {
        let grid = read_grid("vendor.XLSX", &offset_workbook()).unwrap();
        assert_eq!(grid.text(4, 3), "356307042441013");
    }

    #[test]
    fn test_numeric_cells_render_without_fraction() {
        assert_eq!(Cell::Number(356307042441013.0).text(), "356307042441013");
        assert_eq!(Cell::Number(76.5).text(), "76.5");
        assert_eq!(Cell::Integer(42).text(), "42");
        assert_eq!(Cell::Text("  076-004 ".into()).text(), "076-004");
    }
}
