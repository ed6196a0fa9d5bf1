//! Structured onboarding form: drafting it from endpoint data, writing it into
//! the generated template, and reading the template's value cells back.

use crate::coord::CellRef;
use crate::error::Result;
use crate::profile::{ApplicationProfile, ConnectionInfo};
use crate::reader;
use crate::records::{UserData, UserRecord};
use crate::template;
use crate::writer::{self, CellValue};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use umya_spreadsheet::structs::Worksheet;
use umya_spreadsheet::Spreadsheet;

const SAMPLE_ACCOUNTS: usize = 3;
const SAMPLE_FIELDS: [&str; SAMPLE_ACCOUNTS] =
    ["sample_account_1", "sample_account_2", "sample_account_3"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationDetails {
    pub application_name: String,
    pub application_owner: String,
    pub description: String,
    pub application_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionDetails {
    pub connector_type: String,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub jdbc_url: String,
    pub authentication: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaMapping {
    pub identity_attribute: String,
    pub display_attribute: String,
    pub account_attributes: Vec<String>,
    pub entitlement_attribute: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entitlements {
    pub discovered_roles: Vec<String>,
    pub entitlement_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountCorrelation {
    pub correlation_rule: String,
    pub correlation_attribute: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProvisioningPolicy {
    pub create_account: String,
    pub update_account: String,
    pub delete_account: String,
    pub manage_entitlements: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationInfo {
    pub total_accounts: usize,
    pub sample_accounts: Vec<UserRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnboardingForm {
    pub application_details: ApplicationDetails,
    pub connection_details: ConnectionDetails,
    pub schema_mapping: SchemaMapping,
    pub entitlements: Entitlements,
    pub account_correlation: AccountCorrelation,
    pub provisioning_policy: ProvisioningPolicy,
    pub aggregation_info: AggregationInfo,
}

impl OnboardingForm {
    pub fn draft(data: &UserData, profile: &ApplicationProfile) -> Self {
        let connection: &ConnectionInfo = &profile.connection;
        let enabled = || "Enabled".to_string();

        Self {
            application_details: ApplicationDetails {
                application_name: profile.application_name.clone(),
                application_owner: profile.business_owner.clone(),
                description: "Application using MongoDB for user authorization and role management"
                    .into(),
                application_type: "Directly Connected".into(),
            },
            connection_details: ConnectionDetails {
                connector_type: "JDBC Connector".into(),
                host: connection.host.clone(),
                port: connection.port,
                database: connection.database.clone(),
                jdbc_url: connection.connection_string(),
                authentication: connection.authentication.clone(),
            },
            schema_mapping: SchemaMapping {
                identity_attribute: data.identity_attribute().to_string(),
                display_attribute: data.display_attribute().to_string(),
                account_attributes: data.attributes().to_vec(),
                entitlement_attribute: "roles".into(),
            },
            entitlements: Entitlements {
                discovered_roles: data.entitlements.clone(),
                entitlement_type: "Multi-valued attribute".into(),
            },
            account_correlation: AccountCorrelation {
                correlation_rule: "Match by email address".into(),
                correlation_attribute: "email".into(),
            },
            provisioning_policy: ProvisioningPolicy {
                create_account: enabled(),
                update_account: enabled(),
                delete_account: enabled(),
                manage_entitlements: enabled(),
            },
            aggregation_info: AggregationInfo {
                total_accounts: data.user_count,
                sample_accounts: data.users.iter().take(SAMPLE_ACCOUNTS).cloned().collect(),
            },
        }
    }

    /// `(section, field, value)` for every template field this form answers.
    pub fn cell_values(&self) -> Vec<(&'static str, &'static str, CellValue)> {
        let app = &self.application_details;
        let conn = &self.connection_details;
        let schema = &self.schema_mapping;
        let ents = &self.entitlements;
        let corr = &self.account_correlation;
        let prov = &self.provisioning_policy;
        let agg = &self.aggregation_info;

        let mut values: Vec<(&str, &str, CellValue)> = vec![
            ("application_details", "application_name", app.application_name.as_str().into()),
            ("application_details", "application_owner", app.application_owner.as_str().into()),
            ("application_details", "description", app.description.as_str().into()),
            ("application_details", "application_type", app.application_type.as_str().into()),
            ("connection_details", "connector_type", conn.connector_type.as_str().into()),
            ("connection_details", "host", conn.host.as_str().into()),
            ("connection_details", "port", CellValue::Number(f64::from(conn.port))),
            ("connection_details", "database", conn.database.as_str().into()),
            ("connection_details", "jdbc_url", conn.jdbc_url.as_str().into()),
            ("connection_details", "authentication", conn.authentication.as_str().into()),
            ("schema_mapping", "identity_attribute", schema.identity_attribute.as_str().into()),
            ("schema_mapping", "display_attribute", schema.display_attribute.as_str().into()),
            ("schema_mapping", "account_attributes", schema.account_attributes.join(", ").into()),
            ("schema_mapping", "entitlement_attribute", schema.entitlement_attribute.as_str().into()),
            ("entitlements", "discovered_roles", ents.discovered_roles.join(", ").into()),
            ("entitlements", "entitlement_type", ents.entitlement_type.as_str().into()),
            ("account_correlation", "correlation_rule", corr.correlation_rule.as_str().into()),
            ("account_correlation", "correlation_attribute", corr.correlation_attribute.as_str().into()),
            ("provisioning_policy", "create_account", prov.create_account.as_str().into()),
            ("provisioning_policy", "update_account", prov.update_account.as_str().into()),
            ("provisioning_policy", "delete_account", prov.delete_account.as_str().into()),
            ("provisioning_policy", "manage_entitlements", prov.manage_entitlements.as_str().into()),
            ("aggregation_info", "total_accounts", agg.total_accounts.into()),
        ];

        for (field, user) in SAMPLE_FIELDS.into_iter().zip(&agg.sample_accounts) {
            let compact = Value::Object(user.0.clone()).to_string();
            values.push(("aggregation_info", field, compact.into()));
        }

        values
    }

    /// Write the form into the template sheet of `book`.
    pub fn write_into(&self, book: &mut Spreadsheet) -> Result<usize> {
        let sheet = reader::require_sheet_mut(book, template::SHEET_NAME)?;

        let mut written = 0;
        for (section, field, value) in self.cell_values() {
            let Some(cell) = template::value_cell(section, field) else {
                tracing::warn!(section, field, "no template cell for form field");
                continue;
            };
            writer::set_cell(sheet, cell, &value);
            written += 1;
        }
        Ok(written)
    }
}

/// Build a fresh template, write the draft into it and save to `output`.
pub fn write_draft(form: &OnboardingForm, output: &Path) -> Result<usize> {
    let mut book = template::build_template();
    let written = form.write_into(&mut book)?;
    reader::save_workbook(&book, output)?;
    tracing::info!(path = %output.display(), cells = written, "draft form written");
    Ok(written)
}

/// Nested section -> field -> value mapping; empty cells are `null`.
pub type FormData = Map<String, Value>;

/// Read the onboarding form's value cells from the active sheet.
pub fn read_form(path: &Path) -> Result<FormData> {
    let book = reader::open_workbook(path)?;
    let sheet = book.get_active_sheet();
    tracing::debug!(sheet = sheet.get_name(), "reading form values");

    let mut form = FormData::new();
    for (_, slots) in template::layout() {
        for slot in slots {
            let value = read_value(sheet, slot.value_cell);
            let section = form
                .entry(slot.section.key)
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(fields) = section {
                fields.insert(slot.field.key.to_string(), value);
            }
        }
    }
    Ok(form)
}

fn read_value(sheet: &Worksheet, cell: CellRef) -> Value {
    writer::raw_value(sheet, cell).map_or(Value::Null, Value::String)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data() -> UserData {
        let users = serde_json::from_value(json!([
            {"userId": "u1", "email": "ada@example.com", "roles": ["user", "admin"]},
            {"userId": "u2", "email": "bo@example.com", "roles": ["user"]},
            {"userId": "u3", "email": "cy@example.com", "roles": []},
            {"userId": "u4", "email": "di@example.com", "roles": ["auditor"]}
        ]))
        .unwrap();
        UserData::from_users(users)
    }

    #[test]
    fn test_draft_form() {
        let form = OnboardingForm::draft(&data(), &ApplicationProfile::default());

        assert_eq!(form.application_details.application_name, "MongoDB Authorization App");
        assert_eq!(form.application_details.application_owner, "IT Security Team");
        assert_eq!(form.connection_details.port, 27017);
        assert_eq!(form.connection_details.jdbc_url, "mongodb://34.172.211.78:27017/app_auth");
        assert_eq!(form.schema_mapping.account_attributes, vec!["userId", "email", "roles"]);
        assert_eq!(form.entitlements.discovered_roles, vec!["admin", "auditor", "user"]);
        assert_eq!(form.aggregation_info.total_accounts, 4);
        assert_eq!(form.aggregation_info.sample_accounts.len(), 3);
    }

    #[test]
    fn test_draft_without_users_uses_schema_defaults() {
        let form = OnboardingForm::draft(&UserData::from_users(Vec::new()), &ApplicationProfile::default());

        assert_eq!(form.schema_mapping.identity_attribute, "userId");
        assert_eq!(form.schema_mapping.display_attribute, "email");
        assert!(form.schema_mapping.account_attributes.is_empty());
        assert!(form.aggregation_info.sample_accounts.is_empty());
    }

    #[test]
    fn test_every_cell_value_has_a_template_slot() {
        let form = OnboardingForm::draft(&data(), &ApplicationProfile::default());
        let values = form.cell_values();

        assert_eq!(values.len(), template::field_slots().len());
        for (section, field, _) in values {
            assert!(template::value_cell(section, field).is_some(), "{section}.{field}");
        }
    }

    #[test]
    fn test_read_empty_template_is_all_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.xlsx");
        template::create_template(&path).unwrap();

        let form = read_form(&path).unwrap();

        assert_eq!(form.len(), 7);
        assert_eq!(
            form["entitlements"],
            json!({"discovered_roles": null, "entitlement_type": null})
        );
    }

    #[test]
    fn test_draft_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.xlsx");
        let form = OnboardingForm::draft(&data(), &ApplicationProfile::default());

        let written = write_draft(&form, &path).unwrap();
        assert_eq!(written, 26);

        let read = read_form(&path).unwrap();
        assert_eq!(
            read["connection_details"],
            json!({
                "connector_type": "JDBC Connector",
                "host": "34.172.211.78",
                "port": "27017",
                "database": "app_auth",
                "jdbc_url": "mongodb://34.172.211.78:27017/app_auth",
                "authentication": "No authentication (development environment)"
            })
        );
        assert_eq!(read["entitlements"]["discovered_roles"], json!("admin, auditor, user"));
        assert_eq!(read["aggregation_info"]["total_accounts"], json!("4"));
        assert_eq!(
            read["aggregation_info"]["sample_account_1"],
            json!(r#"{"userId":"u1","email":"ada@example.com","roles":["user","admin"]}"#)
        );
    }
}
