//! Filling the multi-sheet onboarding questionnaire.

use crate::client::QueryClient;
use crate::coord::CellRef;
use crate::error::{Error, Result};
use crate::profile::ApplicationProfile;
use crate::reader;
use crate::records::UserData;
use crate::writer::{self, CellValue};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use umya_spreadsheet::Spreadsheet;

pub const DEFAULT_TEMPLATE: &str = "SailPoint_Onboarding_Application_Questionnaire_v2.xlsx";

pub const GENERAL_INFORMATION: &str = "Application General Information";
pub const ONBOARDING_FORM: &str = "Application On-boarding Form";
pub const ENVIRONMENT: &str = "Environment";
// The questionnaire ships with a trailing space in this sheet name.
pub const PROCESS_TYPE: &str = "Process type ";
pub const ROLES: &str = "Roles";

const B: u32 = 2;
const C: u32 = 3;
const D: u32 = 4;
const G: u32 = 7;
const H: u32 = 8;
const I: u32 = 9;
const J: u32 = 10;

/// Roles are listed from the row after this one.
const ROLES_HEADER_ROW: u32 = 2;

fn at(col: u32, row: u32) -> CellRef {
    CellRef::new(col, row)
}

/// Values destined for one sheet, in write order.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetPlan {
    pub sheet: &'static str,
    pub cells: Vec<(CellRef, CellValue)>,
}

impl SheetPlan {
    fn new(sheet: &'static str) -> Self {
        Self {
            sheet,
            cells: Vec::new(),
        }
    }

    fn set(&mut self, cell: CellRef, value: impl Into<CellValue>) -> &mut Self {
        self.cells.push((cell, value.into()));
        self
    }
}

pub fn build_plan(data: &UserData, profile: &ApplicationProfile) -> Vec<SheetPlan> {
    vec![
        general_information(data, profile),
        onboarding_form(profile),
        environment(profile),
        process_type(profile),
        roles(data),
    ]
}

fn general_information(data: &UserData, p: &ApplicationProfile) -> SheetPlan {
    let mut plan = SheetPlan::new(GENERAL_INFORMATION);
    plan.set(at(C, 12), p.application_name.as_str())
        .set(at(C, 19), p.description.as_str())
        .set(at(D, 21), p.submitted_by.as_str())
        .set(at(C, 25), p.business_owner.as_str())
        .set(at(C, 26), p.technical_owner.as_str())
        .set(at(C, 27), p.lead_technical_contact.as_str())
        .set(at(C, 29), p.sourcing.as_str())
        .set(at(C, 30), p.environments.as_str())
        .set(at(C, 31), p.domain.as_str())
        .set(at(C, 32), p.business_objectives.as_str())
        .set(at(C, 33), p.sow_required.as_str())
        .set(at(C, 34), data.user_count.to_string())
        .set(at(C, 35), p.directory_usage.as_str())
        .set(at(C, 36), p.provisioning_process.as_str())
        .set(at(C, 37), p.account_creation_process.as_str())
        .set(at(C, 38), p.account_types.as_str())
        .set(at(C, 39), data.roles_summary())
        .set(at(C, 40), p.multiple_roles.as_str())
        .set(at(C, 41), p.elevated_privileges.as_str())
        .set(at(C, 42), p.rbac.as_str())
        .set(at(C, 43), p.super_admin.as_str())
        .set(at(C, 44), p.sod_policies.as_str());
    plan
}

fn onboarding_form(p: &ApplicationProfile) -> SheetPlan {
    let mut plan = SheetPlan::new(ONBOARDING_FORM);
    plan.set(at(C, 13), p.case_sensitive.as_str())
        .set(at(C, 14), p.authorized_to_change.as_str())
        .set(at(C, 15), p.disabled_accounts.as_str())
        .set(at(C, 16), p.dormant_accounts.as_str())
        .set(at(C, 17), p.service_accounts.as_str())
        .set(at(C, 18), p.password_rotation.as_str())
        .set(at(C, 20), p.business_owner.as_str())
        .set(at(C, 21), p.attribute_names.as_str());
    plan
}

fn environment(p: &ApplicationProfile) -> SheetPlan {
    let conn = &p.connection;
    let mut plan = SheetPlan::new(ENVIRONMENT);
    plan.set(at(G, 13), conn.host.as_str())
        .set(at(G, 14), conn.port.to_string())
        .set(at(G, 15), conn.database.as_str())
        .set(at(G, 16), conn.username.as_str())
        .set(at(G, 17), conn.password_note.as_str())
        .set(at(G, 18), conn.connection_string())
        .set(at(G, 23), conn.api_base_url.as_str());
    plan
}

fn process_type(p: &ApplicationProfile) -> SheetPlan {
    let mut plan = SheetPlan::new(PROCESS_TYPE);
    let steps = [
        &p.create_account,
        &p.modify_account,
        &p.disable_account,
        &p.delete_account,
    ];
    for (row, step) in (3..).zip(steps) {
        plan.set(at(B, row), step.supported.as_str())
            .set(at(C, row), step.description.as_str());
    }
    plan.set(at(B, 7), p.required_attributes.as_str());
    plan
}

fn roles(data: &UserData) -> SheetPlan {
    let mut plan = SheetPlan::new(ROLES);
    for (idx, role) in (1..).zip(&data.entitlements) {
        let row = ROLES_HEADER_ROW + idx;
        plan.set(at(G, row), CellValue::Number(f64::from(idx)))
            .set(at(H, row), role.as_str())
            .set(at(I, row), format!("{role} permissions"))
            .set(at(J, row), format!("Standard {role} role"));
    }
    plan
}

/// Apply each plan to its sheet. Sheets missing from the workbook are skipped.
/// Returns the names of the sheets that were written.
pub fn apply_plan(book: &mut Spreadsheet, plans: &[SheetPlan]) -> Vec<&'static str> {
    let mut filled = Vec::new();
    for plan in plans {
        let Some(sheet) = book.get_sheet_by_name_mut(plan.sheet) else {
            tracing::warn!(sheet = plan.sheet, "sheet not in template, skipping");
            continue;
        };
        for (cell, value) in &plan.cells {
            let target = writer::set_cell(sheet, *cell, value);
            if target != *cell {
                tracing::debug!(sheet = plan.sheet, %cell, %target, "merged cell redirected");
            }
        }
        tracing::debug!(sheet = plan.sheet, cells = plan.cells.len(), "sheet filled");
        filled.push(plan.sheet);
    }
    filled
}

pub fn default_output_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    dir.join(format!(
        "SailPoint_Onboarding_Filled_{}.xlsx",
        now.format("%Y%m%d_%H%M%S")
    ))
}

pub struct FillRequest<'a> {
    pub template: &'a Path,
    pub output: Option<&'a Path>,
    pub output_dir: &'a Path,
    pub profile: &'a ApplicationProfile,
}

#[derive(Debug, Serialize)]
pub struct FillReport {
    pub message: String,
    pub output_file: String,
    pub total_accounts: usize,
    pub entitlements: Vec<String>,
    pub filled_sheets: Vec<&'static str>,
}

/// Fetch user data, fill the questionnaire template and save the result.
pub fn fill(request: &FillRequest<'_>, client: &QueryClient) -> Result<FillReport> {
    if !request.template.exists() {
        return Err(Error::FileNotFound(request.template.to_path_buf()));
    }

    let data = client.fetch_user_data()?;

    let mut book = reader::open_workbook(request.template)?;
    let plans = build_plan(&data, request.profile);
    let filled_sheets = apply_plan(&mut book, &plans);

    let output = match request.output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(request.output_dir, Local::now()),
    };
    reader::save_workbook(&book, &output)?;
    tracing::info!(path = %output.display(), sheets = filled_sheets.len(), "questionnaire filled");

    Ok(FillReport {
        message: format!(
            "Excel form filled successfully and saved to: {}",
            output.display()
        ),
        output_file: output.display().to_string(),
        total_accounts: data.user_count,
        entitlements: data.entitlements,
        filled_sheets,
    })
}
