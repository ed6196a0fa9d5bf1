use crate::error::{Error, Result};
use std::path::Path;
use umya_spreadsheet::structs::Worksheet;
use umya_spreadsheet::Spreadsheet;

pub fn open_workbook(path: &Path) -> Result<Spreadsheet> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => open_xlsx(path),
        "xls" => open_xls(path),
        _ => Err(Error::UnsupportedFormat(extension)),
    }
}

fn open_xlsx(path: &Path) -> Result<Spreadsheet> {
    umya_spreadsheet::reader::xlsx::read(path).map_err(|e| Error::InvalidExcel {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

fn open_xls(path: &Path) -> Result<Spreadsheet> {
    xlrd::open(path).map_err(|e| Error::InvalidExcel {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

pub fn save_workbook(workbook: &Spreadsheet, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    umya_spreadsheet::writer::xlsx::write(workbook, path).map_err(|e| Error::WorkbookWrite {
        path: path.to_path_buf(),
        details: e.to_string(),
    })
}

pub fn get_sheet_names(workbook: &Spreadsheet) -> Vec<String> {
    workbook
        .get_sheet_collection()
        .iter()
        .map(|sheet| sheet.get_name().to_string())
        .collect()
}

pub fn require_sheet_mut<'a>(workbook: &'a mut Spreadsheet, name: &str) -> Result<&'a mut Worksheet> {
    let available = get_sheet_names(workbook).join(", ");
    workbook
        .get_sheet_by_name_mut(name)
        .ok_or_else(|| Error::SheetNotFound {
            name: name.to_string(),
            available,
        })
}
