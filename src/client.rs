//! Blocking client for the user-data query endpoint.

use crate::error::{Error, Result};
use crate::records::{UserData, UserRecord};
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://34.9.116.130:3000/mcp/query";
pub const USER_DATA_QUERY: &str = "get_user_data";

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

pub struct QueryClient {
    endpoint: String,
    agent: ureq::Agent,
}

impl QueryClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            endpoint: endpoint.into(),
            agent,
        }
    }

    /// POST `{"query": "get_user_data"}` and decode the returned array of users.
    pub fn fetch_users(&self) -> Result<Vec<UserRecord>> {
        tracing::debug!(endpoint = %self.endpoint, query = USER_DATA_QUERY, "querying endpoint");

        let response = self
            .agent
            .post(&self.endpoint)
            .send_json(QueryRequest {
                query: USER_DATA_QUERY,
            })
            .map_err(|e| match e {
                ureq::Error::Status(status, _) => Error::Http {
                    url: self.endpoint.clone(),
                    status,
                },
                ureq::Error::Transport(transport) => Error::Transport(transport.to_string()),
            })?;

        let users: Vec<UserRecord> = response.into_json().map_err(|e| Error::MalformedResponse {
            url: self.endpoint.clone(),
            details: e.to_string(),
        })?;

        tracing::info!(count = users.len(), "fetched user records");
        Ok(users)
    }

    pub fn fetch_user_data(&self) -> Result<UserData> {
        self.fetch_users().map(UserData::from_users)
    }
}
