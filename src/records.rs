//! User records returned by the query endpoint and the summary derived from them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// One user document, kept verbatim so every attribute survives in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(pub Map<String, Value>);

impl UserRecord {
    /// String entries of the `roles` array; anything else counts as no roles.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.0
            .get("roles")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    pub fn attribute_names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    pub identity_attribute: String,
    pub display_attribute: String,
    pub attributes: Vec<String>,
}

pub const IDENTITY_ATTRIBUTE: &str = "userId";
pub const DISPLAY_ATTRIBUTE: &str = "email";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserData {
    pub user_count: usize,
    pub users: Vec<UserRecord>,
    /// `None` when the endpoint returned no users; serialized as `{}`.
    #[serde(serialize_with = "schema_or_empty")]
    pub schema: Option<Schema>,
    pub entitlements: Vec<String>,
}

fn schema_or_empty<S: serde::Serializer>(
    schema: &Option<Schema>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match schema {
        Some(schema) => schema.serialize(serializer),
        None => Map::new().serialize(serializer),
    }
}

impl UserData {
    pub fn from_users(users: Vec<UserRecord>) -> Self {
        let schema = users.first().map(|first| Schema {
            identity_attribute: IDENTITY_ATTRIBUTE.to_string(),
            display_attribute: DISPLAY_ATTRIBUTE.to_string(),
            attributes: first.attribute_names(),
        });

        let entitlements: BTreeSet<&str> = users.iter().flat_map(|user| user.roles()).collect();
        let entitlements = entitlements.into_iter().map(str::to_string).collect();

        Self {
            user_count: users.len(),
            schema,
            entitlements,
            users,
        }
    }

    /// `"<n> roles: a, b"`
    pub fn roles_summary(&self) -> String {
        format!(
            "{} roles: {}",
            self.entitlements.len(),
            self.entitlements.join(", ")
        )
    }

    pub fn identity_attribute(&self) -> &str {
        self.schema
            .as_ref()
            .map_or(IDENTITY_ATTRIBUTE, |s| s.identity_attribute.as_str())
    }

    pub fn display_attribute(&self) -> &str {
        self.schema
            .as_ref()
            .map_or(DISPLAY_ATTRIBUTE, |s| s.display_attribute.as_str())
    }

    pub fn attributes(&self) -> &[String] {
        self.schema
            .as_ref()
            .map(|s| s.attributes.as_slice())
            .unwrap_or_default()
    }
}
