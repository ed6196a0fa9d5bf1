use crate::coord::{CellRange, CellRef};
use crate::error::Result;
use csv::WriterBuilder;
use ssfmt::{FormatOptions, NumberFormat};
use std::io::Write;
use umya_spreadsheet::structs::Worksheet;

/// A value destined for a single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<usize> for CellValue {
    fn from(value: usize) -> Self {
        CellValue::Number(value as f64)
    }
}

/// Resolve the cell that actually receives a write: the top-left cell of
/// the merged range containing `cell`, or `cell` itself.
pub fn write_target(sheet: &Worksheet, cell: CellRef) -> CellRef {
    sheet
        .get_merge_cells()
        .iter()
        .filter_map(|range| CellRange::parse(&range.get_range()).ok())
        .find(|range| range.contains(cell))
        .map(|range| range.top_left())
        .unwrap_or(cell)
}

/// Write a value, redirecting writes inside merged ranges to the range's
/// top-left cell. Returns the cell that was written.
pub fn set_cell(sheet: &mut Worksheet, cell: CellRef, value: &CellValue) -> CellRef {
    let target = write_target(sheet, cell);
    let target_cell = sheet.get_cell_mut((target.col, target.row));
    match value {
        CellValue::Text(s) => {
            target_cell.set_value(s.as_str());
        }
        CellValue::Number(n) => {
            target_cell.set_value_number(*n);
        }
    }
    target
}

/// Raw stored text of a cell, `None` when the cell is absent or empty.
pub fn raw_value(sheet: &Worksheet, cell: CellRef) -> Option<String> {
    let value = sheet.get_cell((cell.col, cell.row))?.get_value();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Write rows `first..=last` of a sheet as delimited text, one record per row.
pub fn write_rows<W: Write>(
    sheet: &Worksheet,
    first: u32,
    last: u32,
    writer: W,
    delimiter: u8,
) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_writer(writer);

    let (max_col, _) = sheet.get_highest_column_and_row();
    let opts = FormatOptions::default();

    for row in first..=last {
        let record: Vec<String> = (1..=max_col)
            .map(|col| get_cell_formatted_value(sheet, col, row, &opts))
            .collect();
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Display text of a cell, honouring its number format.
pub fn formatted_value(sheet: &Worksheet, cell: CellRef) -> String {
    get_cell_formatted_value(sheet, cell.col, cell.row, &FormatOptions::default())
}

/// Get a cell's formatted value using ssfmt for proper Excel format code support.
fn get_cell_formatted_value(sheet: &Worksheet, col: u32, row: u32, opts: &FormatOptions) -> String {
    let Some(cell) = sheet.get_cell((col, row)) else {
        return String::new();
    };

    let raw_value = cell.get_value();
    if raw_value.is_empty() {
        return String::new();
    }

    let format_code = cell
        .get_style()
        .get_number_format()
        .map(|nf| nf.get_format_code())
        .unwrap_or("General");

    let fmt = match NumberFormat::parse(format_code) {
        Ok(f) => f,
        Err(_) => return raw_value.to_string(),
    };

    // Dates are serial numbers too
    if let Ok(num) = raw_value.parse::<f64>() {
        return fmt.format(num, opts);
    }

    fmt.format_text(&raw_value, opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet_with_merge(range: &str) -> umya_spreadsheet::Spreadsheet {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.add_merge_cells(range);
        book
    }

    #[test]
    fn test_set_cell_plain() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();

        let written = set_cell(sheet, CellRef::new(3, 12), &"MongoDB Authorization App".into());

        assert_eq!(written, CellRef::new(3, 12));
        assert_eq!(
            raw_value(sheet, CellRef::new(3, 12)).as_deref(),
            Some("MongoDB Authorization App")
        );
    }

    #[test]
    fn test_set_cell_redirects_into_merged_top_left() {
        let mut book = sheet_with_merge("D21:F21");
        let sheet = book.get_sheet_mut(&0).unwrap();

        let written = set_cell(sheet, CellRef::new(5, 21), &"Automated Agent".into());

        assert_eq!(written, CellRef::new(4, 21));
        assert_eq!(raw_value(sheet, CellRef::new(4, 21)).as_deref(), Some("Automated Agent"));
        assert_eq!(raw_value(sheet, CellRef::new(5, 21)), None);
    }

    #[test]
    fn test_set_cell_number() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();

        set_cell(sheet, CellRef::new(7, 3), &CellValue::from(1usize));

        assert_eq!(raw_value(sheet, CellRef::new(7, 3)).as_deref(), Some("1"));
    }

    #[test]
    fn test_raw_value_empty() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut("A1").set_value("");

        assert_eq!(raw_value(sheet, CellRef::new(1, 1)), None);
        assert_eq!(raw_value(sheet, CellRef::new(9, 9)), None);
    }

    #[test]
    fn test_write_rows_delimited() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut("A1").set_value("Field");
        sheet.get_cell_mut("B1").set_value("Value");
        sheet.get_cell_mut("A2").set_value("Port");
        sheet.get_cell_mut("B2").set_value("27017");

        let mut out = Vec::new();
        write_rows(sheet, 1, 2, &mut out, b'\t').unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Field\tValue\nPort\t27017\n");
    }
}
