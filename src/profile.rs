//! Literal answers written into the questionnaire.
//!
//! Every field has a built-in default; a JSON profile passed with `--profile`
//! overrides any subset of them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where the application's account store lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password_note: String,
    pub api_base_url: String,
    pub authentication: String,
}

impl Default for ConnectionInfo {
    fn default() -> Self {
        Self {
            host: "34.172.211.78".into(),
            port: 27017,
            database: "app_auth".into(),
            username: "sailpoint_readonly".into(),
            password_note: "[Stored in Secrets Manager]".into(),
            api_base_url: "http://34.9.116.130:3000".into(),
            authentication: "No authentication (development environment)".into(),
        }
    }
}

impl ConnectionInfo {
    pub fn connection_string(&self) -> String {
        format!("mongodb://{}:{}/{}", self.host, self.port, self.database)
    }
}

/// Provisioning step answer: supported flag plus how it is done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessStep {
    pub supported: String,
    pub description: String,
}

impl Default for ProcessStep {
    fn default() -> Self {
        Self {
            supported: "Yes".into(),
            description: String::new(),
        }
    }
}

impl ProcessStep {
    fn yes(description: &str) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationProfile {
    pub application_name: String,
    pub description: String,
    pub submitted_by: String,
    pub business_owner: String,
    pub technical_owner: String,
    pub lead_technical_contact: String,
    pub sourcing: String,
    pub environments: String,
    pub domain: String,
    pub business_objectives: String,
    pub sow_required: String,
    pub directory_usage: String,
    pub provisioning_process: String,
    pub account_creation_process: String,
    pub account_types: String,
    pub multiple_roles: String,
    pub elevated_privileges: String,
    pub rbac: String,
    pub super_admin: String,
    pub sod_policies: String,

    pub case_sensitive: String,
    pub authorized_to_change: String,
    pub disabled_accounts: String,
    pub dormant_accounts: String,
    pub service_accounts: String,
    pub password_rotation: String,
    pub attribute_names: String,

    pub create_account: ProcessStep,
    pub modify_account: ProcessStep,
    pub disable_account: ProcessStep,
    pub delete_account: ProcessStep,
    pub required_attributes: String,

    pub connection: ConnectionInfo,
}

impl Default for ApplicationProfile {
    fn default() -> Self {
        Self {
            application_name: "MongoDB Authorization App".into(),
            description: "MongoDB-based application managing user authorization, roles, and permissions for internal systems.".into(),
            submitted_by: "Automated Agent".into(),
            business_owner: "IT Security Team".into(),
            technical_owner: "Database Administrator".into(),
            lead_technical_contact: "MongoDB Team".into(),
            sourcing: "Internally Developed".into(),
            environments: "DEV, UAT, PROD".into(),
            domain: "CWS".into(),
            business_objectives: "Centralized user access management and role-based authorization".into(),
            sow_required: "No".into(),
            directory_usage: "No - uses MongoDB for authentication".into(),
            provisioning_process: "Manual - Database updates".into(),
            account_creation_process: "Direct MongoDB document insertion with role assignment".into(),
            account_types: "Employee, Contractor".into(),
            multiple_roles: "Yes".into(),
            elevated_privileges: "Admin role provides elevated access to system configuration".into(),
            rbac: "Yes - role-based access controls implemented".into(),
            super_admin: "Yes - 'admin' role has full system access".into(),
            sod_policies: "Yes - admin and user roles have separation".into(),

            case_sensitive: "Yes".into(),
            authorized_to_change: "Database Administrator".into(),
            disabled_accounts: "Yes - status='inactive'".into(),
            dormant_accounts: "Yes - via status field".into(),
            service_accounts: "Yes - MongoDB connection credentials".into(),
            password_rotation: "Quarterly".into(),
            attribute_names: "userId, firstName, lastName, email, status, roles".into(),

            create_account: ProcessStep::yes(
                "Create user document in MongoDB with required attributes and roles",
            ),
            modify_account: ProcessStep::yes("Update user document fields including roles array"),
            disable_account: ProcessStep::yes("Set status field to 'inactive'"),
            delete_account: ProcessStep::yes("Remove user document from collection"),
            required_attributes: "userId, firstName, lastName, email, status, roles[]".into(),

            connection: ConnectionInfo::default(),
        }
    }
}

impl ApplicationProfile {
    /// Load a profile from JSON; `None` yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path)?;
        let profile = serde_json::from_str(&text).map_err(|source| Error::InvalidProfile {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded application profile");
        Ok(profile)
    }
}
