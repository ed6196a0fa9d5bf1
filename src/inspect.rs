//! Human-oriented inspection of a workbook: per-sheet structure and likely
//! form fields.

use crate::coord::CellRef;
use crate::error::Result;
use crate::writer;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::Write;
use umya_spreadsheet::structs::Worksheet;
use umya_spreadsheet::Spreadsheet;

/// Sheets of the questionnaire that carry fillable fields.
pub const DEFAULT_FORM_SHEETS: &[&str] = &[
    "Application General Information",
    "Application On-boarding Form",
    "Process type ",
    "Environment",
];

pub const DEFAULT_FIELD_LIMIT: usize = 30;

const PREVIEW_ROWS: u32 = 5;
const SAMPLE_ROWS: u32 = 3;
const MAX_LABEL_CHARS: usize = 200;
const LABEL_DISPLAY_CHARS: usize = 60;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetAnalysis {
    pub name: String,
    /// Data rows below the header row, and columns.
    pub dimensions: (u32, u32),
    pub columns: Vec<String>,
    pub sample_data: Vec<Map<String, Value>>,
    pub empty_cells: Map<String, Value>,
}

impl SheetAnalysis {
    pub fn non_empty_gaps(&self) -> impl Iterator<Item = (&String, u64)> {
        self.empty_cells
            .iter()
            .filter_map(|(column, count)| count.as_u64().filter(|n| *n > 0).map(|n| (column, n)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkbookAnalysis {
    pub sheet_names: Vec<String>,
    pub sheets: Vec<SheetAnalysis>,
}

pub fn analyze(book: &Spreadsheet) -> WorkbookAnalysis {
    let sheets: Vec<SheetAnalysis> = book.get_sheet_collection().iter().map(analyze_sheet).collect();
    WorkbookAnalysis {
        sheet_names: sheets.iter().map(|s| s.name.clone()).collect(),
        sheets,
    }
}

/// Row 1 is the header; everything below it is data.
pub fn analyze_sheet(sheet: &Worksheet) -> SheetAnalysis {
    let (max_col, max_row) = sheet.get_highest_column_and_row();
    let data_rows = max_row.saturating_sub(1);

    let headers = (1..=max_col).map(|col| {
        let header = writer::formatted_value(sheet, CellRef::new(col, 1));
        if header.trim().is_empty() {
            format!("Unnamed: {}", col - 1)
        } else {
            header
        }
    });
    let columns = unique_columns(headers);

    let sample_data: Vec<Map<String, Value>> = (2..=max_row.min(1 + SAMPLE_ROWS))
        .map(|row| {
            columns
                .iter()
                .zip(1..)
                .map(|(column, col)| {
                    let text = writer::formatted_value(sheet, CellRef::new(col, row));
                    let value = if text.is_empty() {
                        Value::Null
                    } else {
                        Value::String(text)
                    };
                    (column.clone(), value)
                })
                .collect()
        })
        .collect();

    let empty_cells: Map<String, Value> = columns
        .iter()
        .zip(1..)
        .map(|(column, col)| {
            let empty = (2..=max_row)
                .filter(|&row| writer::raw_value(sheet, CellRef::new(col, row)).is_none())
                .count();
            (column.clone(), Value::from(empty))
        })
        .collect();

    SheetAnalysis {
        name: sheet.get_name().to_string(),
        dimensions: (data_rows, max_col),
        columns,
        sample_data,
        empty_cells,
    }
}

/// Suffix repeated header names with `.1`, `.2`, ... so every column key is
/// distinct.
fn unique_columns(headers: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    headers
        .into_iter()
        .map(|header| {
            let mut column = header.clone();
            let mut n = 0;
            while !seen.insert(column.clone()) {
                n += 1;
                column = format!("{header}.{n}");
            }
            column
        })
        .collect()
}

pub fn render_analysis<W: Write>(
    book: &Spreadsheet,
    analysis: &WorkbookAnalysis,
    mut out: W,
) -> Result<()> {
    let rule = "=".repeat(80);
    writeln!(out, "Total Sheets: {}", analysis.sheet_names.len())?;
    writeln!(out, "Sheet Names: {}\n", analysis.sheet_names.join(", "))?;

    for sheet_analysis in &analysis.sheets {
        writeln!(out, "{rule}\nSHEET: {}\n{rule}", sheet_analysis.name)?;
        let (rows, cols) = sheet_analysis.dimensions;
        writeln!(out, "\nDimensions: {rows} rows x {cols} columns")?;
        writeln!(out, "\nColumns: {}", sheet_analysis.columns.join(", "))?;

        if let Some(sheet) = book.get_sheet_by_name(&sheet_analysis.name) {
            writeln!(out, "\nFirst {PREVIEW_ROWS} rows:")?;
            writeln!(out, "{}", sheet_analysis.columns.join("\t"))?;
            let last = (1 + PREVIEW_ROWS).min(rows + 1);
            if last >= 2 {
                writer::write_rows(sheet, 2, last, &mut out, b'\t')?;
            }
        }

        let gaps: Vec<_> = sheet_analysis.non_empty_gaps().collect();
        if !gaps.is_empty() {
            writeln!(out, "\nEmpty/Missing cells per column:")?;
            for (column, count) in gaps {
                writeln!(out, "  {column}: {count}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// A cell that looks like a label, and the cell to its right that takes the value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub row: u32,
    pub col: u32,
    pub cell_ref: String,
    pub label: String,
    pub value_cell: String,
}

/// Scan a sheet row by row. A non-blank cell whose right neighbour is empty
/// or blank, and whose text is shorter than 200 characters, is a label.
pub fn detect_fields(sheet: &Worksheet) -> Vec<FormField> {
    let (max_col, max_row) = sheet.get_highest_column_and_row();
    let mut fields = Vec::new();

    for row in 1..=max_row {
        for col in 1..=max_col {
            let cell = CellRef::new(col, row);
            let Some(text) = writer::raw_value(sheet, cell) else {
                continue;
            };
            let label = text.trim();
            if label.is_empty() || text.chars().count() >= MAX_LABEL_CHARS {
                continue;
            }

            let next_blank = writer::raw_value(sheet, cell.right())
                .map_or(true, |next| next.trim().is_empty());
            if next_blank {
                fields.push(FormField {
                    row,
                    col,
                    cell_ref: cell.to_string(),
                    label: label.to_string(),
                    value_cell: cell.right().to_string(),
                });
            }
        }
    }

    fields
}

pub fn render_fields<W: Write>(
    mut out: W,
    sheet_name: &str,
    fields: &[FormField],
    limit: usize,
) -> Result<()> {
    let rule = "=".repeat(80);
    writeln!(out, "\n{rule}\nSHEET: {sheet_name}\n{rule}\n")?;
    if fields.is_empty() {
        return Ok(());
    }

    writeln!(out, "Found {} potential form fields:\n", fields.len())?;
    for (idx, field) in fields.iter().take(limit).enumerate() {
        let label: String = field.label.chars().take(LABEL_DISPLAY_CHARS).collect();
        writeln!(out, "{:2}. [{}] {}", idx + 1, field.cell_ref, label)?;
        writeln!(out, "    -> Value goes in: {}\n", field.value_cell)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn form_sheet() -> Spreadsheet {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_active_sheet_mut();
        sheet.set_name("Environment");
        sheet.get_cell_mut("B2").set_value("Production Details");
        sheet.get_cell_mut("C2").set_value("Value");
        sheet.get_cell_mut("B3").set_value("  Hostname  ");
        sheet.get_cell_mut("B4").set_value("Port");
        sheet.get_cell_mut("C4").set_value("   ");
        sheet.get_cell_mut("B5").set_value("x".repeat(250));
        sheet.get_cell_mut("D5").set_value("   ");
        book
    }

    #[test]
    fn test_detect_fields() {
        let book = form_sheet();
        let fields = detect_fields(book.get_active_sheet());

        let found: Vec<(&str, &str, &str)> = fields
            .iter()
            .map(|f| (f.cell_ref.as_str(), f.label.as_str(), f.value_cell.as_str()))
            .collect();
        assert_eq!(
            found,
            vec![
                ("C2", "Value", "D2"),
                ("B3", "Hostname", "C3"),
                ("B4", "Port", "C4"),
            ]
        );
        assert_eq!((fields[1].row, fields[1].col), (3, 2));
    }

    #[test]
    fn test_render_fields_truncates() {
        let fields = vec![FormField {
            row: 1,
            col: 1,
            cell_ref: "A1".into(),
            label: "L".repeat(80),
            value_cell: "B1".into(),
        }];
        let mut out = Vec::new();
        render_fields(&mut out, "Roles", &fields, 30).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Found 1 potential form fields:"));
        assert!(text.contains(&format!(" 1. [A1] {}\n", "L".repeat(60))));
        assert!(text.contains("-> Value goes in: B1"));
    }

    #[test]
    fn test_analyze_sheet() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_active_sheet_mut();
        sheet.set_name("Roles");
        sheet.get_cell_mut("A1").set_value("S.no");
        sheet.get_cell_mut("C1").set_value("Role");
        sheet.get_cell_mut("A2").set_value("1");
        sheet.get_cell_mut("C2").set_value("admin");
        sheet.get_cell_mut("A3").set_value("2");

        let analysis = analyze(&book);
        let roles = &analysis.sheets[0];

        assert_eq!(analysis.sheet_names, vec!["Roles"]);
        assert_eq!(roles.dimensions, (2, 3));
        assert_eq!(roles.columns, vec!["S.no", "Unnamed: 1", "Role"]);
        assert_eq!(
            serde_json::to_value(&roles.empty_cells).unwrap(),
            json!({"S.no": 0, "Unnamed: 1": 2, "Role": 1})
        );
        assert_eq!(
            serde_json::to_value(&roles.sample_data).unwrap(),
            json!([
                {"S.no": "1", "Unnamed: 1": null, "Role": "admin"},
                {"S.no": "2", "Unnamed: 1": null, "Role": null}
            ])
        );
        let gaps: Vec<_> = roles.non_empty_gaps().map(|(c, n)| (c.as_str(), n)).collect();
        assert_eq!(gaps, vec![("Unnamed: 1", 2), ("Role", 1)]);
    }

    #[test]
    fn test_analyze_sheet_repeated_headers() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_active_sheet_mut();
        sheet.get_cell_mut("A1").set_value("Role Name");
        sheet.get_cell_mut("B1").set_value("Role Name");
        sheet.get_cell_mut("C1").set_value("Role Name");
        sheet.get_cell_mut("D1").set_value("Role Name.1");
        sheet.get_cell_mut("A2").set_value("admin");
        sheet.get_cell_mut("A3").set_value("user");
        sheet.get_cell_mut("B2").set_value("auditor");

        let analysis = analyze_sheet(book.get_active_sheet());

        assert_eq!(
            analysis.columns,
            vec!["Role Name", "Role Name.1", "Role Name.2", "Role Name.1.1"]
        );
        assert_eq!(
            serde_json::to_value(&analysis.empty_cells).unwrap(),
            json!({"Role Name": 0, "Role Name.1": 1, "Role Name.2": 2, "Role Name.1.1": 2})
        );
        assert_eq!(
            serde_json::to_value(&analysis.sample_data[0]).unwrap(),
            json!({"Role Name": "admin", "Role Name.1": "auditor", "Role Name.2": null, "Role Name.1.1": null})
        );
    }

    #[test]
    fn test_render_analysis() {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_active_sheet_mut();
        sheet.get_cell_mut("A1").set_value("Field");
        sheet.get_cell_mut("A2").set_value("Host");

        let analysis = analyze(&book);
        let mut out = Vec::new();
        render_analysis(&book, &analysis, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("Total Sheets: 1\nSheet Names: Sheet1\n"));
        assert!(text.contains("Dimensions: 1 rows x 1 columns"));
        assert!(text.contains("First 5 rows:\nField\nHost\n"));
        assert!(!text.contains("Empty/Missing"));
    }
}
