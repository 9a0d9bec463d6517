//! # HTTP client
//!
//! Thin wrapper over `reqwest` for the hub's table endpoints.

use lg_core::superjson::{self, SuperJsonError};
use lg_core::{params, LeadsResponse, SearchParams};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unreadable response: {0}")]
    Decode(#[from] SuperJsonError),
}

pub struct LeadsClient {
    http: reqwest::Client,
    base_url: String,
    table: Option<String>,
}

impl LeadsClient {
    pub fn new(base_url: impl Into<String>, table: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            table,
        }
    }

    /// Page URL for `search`, using the canonical encoding.
    pub fn url(&self, search: &SearchParams) -> String {
        let path = match &self.table {
            Some(table) => format!("/api/tables/{table}"),
            None => "/api/leads".to_string(),
        };
        format!("{}{}?{}", self.base_url, path, params::encode(search))
    }

    pub async fn fetch(&self, search: &SearchParams) -> Result<LeadsResponse, ClientError> {
        let resp = self.http.get(self.url(search)).send().await?;
        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            let body = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(body);
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(superjson::from_str(&body)?)
    }
}
