//! Layout of the single-sheet onboarding form and the builder that renders it.

use crate::coord::{CellRange, CellRef};
use crate::error::Result;
use crate::reader;
use serde::Serialize;
use std::path::Path;
use umya_spreadsheet::structs::{Border, HorizontalAlignmentValues, Worksheet};
use umya_spreadsheet::Spreadsheet;

pub const SHEET_NAME: &str = "SailPoint Onboarding Form";
pub const TITLE: &str = "SailPoint Application Onboarding Form";
pub const DEFAULT_OUTPUT: &str = "SailPoint_Onboarding_Template.xlsx";

const TITLE_ROW: u32 = 1;
const FIRST_SECTION_ROW: u32 = 3;
const LABEL_COL: u32 = 1;
const VALUE_COL: u32 = 2;

const HEADER_FILL: &str = "FF4472C4";
const SECTION_FILL: &str = "FFD9E1F2";
const WHITE: &str = "FFFFFFFF";

#[derive(Debug)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
}

#[derive(Debug)]
pub struct Section {
    pub key: &'static str,
    pub title: &'static str,
    pub fields: &'static [Field],
}

const fn field(key: &'static str, label: &'static str) -> Field {
    Field { key, label }
}

pub const SECTIONS: &[Section] = &[
    Section {
        key: "application_details",
        title: "1. Application Details",
        fields: &[
            field("application_name", "Application Name"),
            field("application_owner", "Application Owner"),
            field("description", "Description"),
            field("application_type", "Application Type"),
        ],
    },
    Section {
        key: "connection_details",
        title: "2. Connection Details",
        fields: &[
            field("connector_type", "Connector Type"),
            field("host", "Host"),
            field("port", "Port"),
            field("database", "Database"),
            field("jdbc_url", "JDBC URL"),
            field("authentication", "Authentication Method"),
        ],
    },
    Section {
        key: "schema_mapping",
        title: "3. Schema Mapping",
        fields: &[
            field("identity_attribute", "Identity Attribute"),
            field("display_attribute", "Display Attribute"),
            field("account_attributes", "Account Attributes"),
            field("entitlement_attribute", "Entitlement Attribute"),
        ],
    },
    Section {
        key: "entitlements",
        title: "4. Entitlements",
        fields: &[
            field("discovered_roles", "Discovered Roles"),
            field("entitlement_type", "Entitlement Type"),
        ],
    },
    Section {
        key: "account_correlation",
        title: "5. Account Correlation",
        fields: &[
            field("correlation_rule", "Correlation Rule"),
            field("correlation_attribute", "Correlation Attribute"),
        ],
    },
    Section {
        key: "provisioning_policy",
        title: "6. Provisioning Policy",
        fields: &[
            field("create_account", "Create Account"),
            field("update_account", "Update Account"),
            field("delete_account", "Delete Account"),
            field("manage_entitlements", "Manage Entitlements"),
        ],
    },
    Section {
        key: "aggregation_info",
        title: "7. Aggregation Information",
        fields: &[
            field("total_accounts", "Total Accounts"),
            field("sample_account_1", "Sample Account 1"),
            field("sample_account_2", "Sample Account 2"),
            field("sample_account_3", "Sample Account 3"),
        ],
    },
];

/// Where one field's label and value live on the sheet.
#[derive(Debug, Clone, Copy)]
pub struct FieldSlot {
    pub section: &'static Section,
    pub field: &'static Field,
    pub label_cell: CellRef,
    pub value_cell: CellRef,
}

/// Row of each section header followed by its field slots.
pub fn layout() -> Vec<(u32, Vec<FieldSlot>)> {
    let mut row = FIRST_SECTION_ROW;
    let mut sections = Vec::with_capacity(SECTIONS.len());

    for section in SECTIONS {
        let header_row = row;
        row += 1;

        let slots = section
            .fields
            .iter()
            .map(|field| {
                let slot = FieldSlot {
                    section,
                    field,
                    label_cell: CellRef::new(LABEL_COL, row),
                    value_cell: CellRef::new(VALUE_COL, row),
                };
                row += 1;
                slot
            })
            .collect();

        sections.push((header_row, slots));
        // blank separator
        row += 1;
    }

    sections
}

/// Field slots in sheet order.
pub fn field_slots() -> Vec<FieldSlot> {
    layout().into_iter().flat_map(|(_, slots)| slots).collect()
}

/// Value cell of `section.field`, if such a field exists.
pub fn value_cell(section: &str, field: &str) -> Option<CellRef> {
    field_slots()
        .into_iter()
        .find(|slot| slot.section.key == section && slot.field.key == field)
        .map(|slot| slot.value_cell)
}

#[derive(Debug, Serialize)]
pub struct TemplateSummary {
    pub output_file: String,
    pub sheet: &'static str,
    pub sections: usize,
    pub fields: usize,
}

pub fn build_template() -> Spreadsheet {
    let mut book = umya_spreadsheet::new_file();
    let sheet = book.get_active_sheet_mut();
    sheet.set_name(SHEET_NAME);

    sheet.get_column_dimension_mut("A").set_width(30.0);
    sheet.get_column_dimension_mut("B").set_width(50.0);

    let title = CellRef::new(LABEL_COL, TITLE_ROW);
    sheet.add_merge_cells(merged_row(TITLE_ROW).to_string());
    sheet.get_cell_mut((title.col, title.row)).set_value(TITLE);
    style_title(sheet, title);

    for (header_row, slots) in layout() {
        let Some(section) = slots.first().map(|slot| slot.section) else {
            continue;
        };
        let header = CellRef::new(LABEL_COL, header_row);
        sheet.get_cell_mut((header.col, header.row)).set_value(section.title);
        style_section(sheet, header);
        sheet.add_merge_cells(merged_row(header_row).to_string());

        for slot in slots {
            sheet
                .get_cell_mut((slot.label_cell.col, slot.label_cell.row))
                .set_value(slot.field.label);
            thin_border(sheet, slot.label_cell);
            thin_border(sheet, slot.value_cell);
        }
    }

    book
}

pub fn create_template(output: &Path) -> Result<TemplateSummary> {
    let book = build_template();
    reader::save_workbook(&book, output)?;
    tracing::info!(path = %output.display(), "template written");

    Ok(TemplateSummary {
        output_file: output.display().to_string(),
        sheet: SHEET_NAME,
        sections: SECTIONS.len(),
        fields: SECTIONS.iter().map(|s| s.fields.len()).sum(),
    })
}

fn merged_row(row: u32) -> CellRange {
    CellRange::new(CellRef::new(LABEL_COL, row), CellRef::new(VALUE_COL, row))
}

fn style_title(sheet: &mut Worksheet, cell: CellRef) {
    let style = sheet.get_style_mut((cell.col, cell.row));
    style.set_background_color(HEADER_FILL);
    let font = style.get_font_mut();
    font.set_bold(true);
    font.set_size(12.0);
    font.get_color_mut().set_argb(WHITE);
    style
        .get_alignment_mut()
        .set_horizontal(HorizontalAlignmentValues::Center);
}

fn style_section(sheet: &mut Worksheet, cell: CellRef) {
    let style = sheet.get_style_mut((cell.col, cell.row));
    style.set_background_color(SECTION_FILL);
    let font = style.get_font_mut();
    font.set_bold(true);
    font.set_size(11.0);
}

fn thin_border(sheet: &mut Worksheet, cell: CellRef) {
    let borders = sheet.get_style_mut((cell.col, cell.row)).get_borders_mut();
    borders.get_left_mut().set_border_style(Border::BORDER_THIN);
    borders.get_right_mut().set_border_style(Border::BORDER_THIN);
    borders.get_top_mut().set_border_style(Border::BORDER_THIN);
    borders.get_bottom_mut().set_border_style(Border::BORDER_THIN);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::raw_value;
    use pretty_assertions::assert_eq;

    fn merged(sheet: &Worksheet) -> Vec<String> {
        sheet
            .get_merge_cells()
            .iter()
            .map(|range| range.get_range())
            .collect()
    }

    #[test]
    fn test_layout_rows() {
        let headers: Vec<u32> = layout().iter().map(|(row, _)| *row).collect();
        assert_eq!(headers, vec![3, 9, 17, 23, 27, 31, 37]);

        let slots = field_slots();
        assert_eq!(slots.len(), 26);
        assert_eq!(slots[0].value_cell.to_string(), "B4");
        assert_eq!(slots.last().unwrap().value_cell.to_string(), "B41");
        assert_eq!(value_cell("connection_details", "jdbc_url").unwrap().to_string(), "B14");
        assert_eq!(value_cell("entitlements", "discovered_roles").unwrap().to_string(), "B24");
        assert!(value_cell("entitlements", "nope").is_none());
    }

    #[test]
    fn test_build_template_contents() {
        let book = build_template();
        let sheet = book.get_sheet_by_name(SHEET_NAME).unwrap();

        assert_eq!(raw_value(sheet, CellRef::new(1, 1)).as_deref(), Some(TITLE));
        assert_eq!(raw_value(sheet, CellRef::new(1, 3)).as_deref(), Some("1. Application Details"));
        assert_eq!(raw_value(sheet, CellRef::new(1, 4)).as_deref(), Some("Application Name"));
        assert_eq!(raw_value(sheet, CellRef::new(2, 4)), None);
        assert_eq!(raw_value(sheet, CellRef::new(1, 8)), None);
        assert_eq!(raw_value(sheet, CellRef::new(1, 9)).as_deref(), Some("2. Connection Details"));
        assert_eq!(raw_value(sheet, CellRef::new(1, 14)).as_deref(), Some("JDBC URL"));
        assert_eq!(raw_value(sheet, CellRef::new(1, 41)).as_deref(), Some("Sample Account 3"));

        let merges = merged(sheet);
        for range in ["A1:B1", "A3:B3", "A9:B9", "A37:B37"] {
            assert!(merges.iter().any(|m| m == range), "missing merge {range}");
        }
        assert_eq!(merges.len(), 8);
    }

    #[test]
    fn test_build_template_styles() {
        let book = build_template();
        let sheet = book.get_sheet_by_name(SHEET_NAME).unwrap();

        let width = |col: &str| *sheet.get_column_dimension(col).unwrap().get_width();
        assert_eq!(width("A"), 30.0);
        assert_eq!(width("B"), 50.0);

        let title = sheet.get_style("A1");
        assert_eq!(title.get_background_color().unwrap().get_argb(), HEADER_FILL);
        let font = title.get_font().unwrap();
        assert!(*font.get_bold());
        assert_eq!(*font.get_size(), 12.0);
        assert_eq!(font.get_color().get_argb(), WHITE);
        assert_eq!(
            title.get_alignment().unwrap().get_horizontal(),
            &HorizontalAlignmentValues::Center
        );

        let section = sheet.get_style("A3");
        assert_eq!(section.get_background_color().unwrap().get_argb(), SECTION_FILL);
        let font = section.get_font().unwrap();
        assert!(*font.get_bold());
        assert_eq!(*font.get_size(), 11.0);

        for cell in ["A4", "B4", "B41"] {
            let borders = sheet.get_style(cell).get_borders().unwrap();
            for border in [
                borders.get_left(),
                borders.get_right(),
                borders.get_top(),
                borders.get_bottom(),
            ] {
                assert_eq!(border.get_border_style(), Border::BORDER_THIN, "cell {cell}");
            }
        }
    }

    #[test]
    fn test_create_template_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT);

        let summary = create_template(&path).unwrap();
        assert_eq!(summary.sections, 7);
        assert_eq!(summary.fields, 26);

        let book = reader::open_workbook(&path).unwrap();
        assert_eq!(reader::get_sheet_names(&book), vec![SHEET_NAME]);
        let sheet = book.get_sheet_by_name(SHEET_NAME).unwrap();
        assert_eq!(raw_value(sheet, CellRef::new(1, 31)).as_deref(), Some("6. Provisioning Policy"));
        assert!(merged(sheet).iter().any(|m| m == "A31:B31"));
    }
}
