use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::domain::SheetRow;
use tracing::{info, warn};
use url::Url;

use crate::{
    auth::{mint_assertion, ServiceAccountCredentials},
    SheetAppender, SheetsError,
};

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

#[derive(Debug, Clone)]
pub struct GoogleSheetsConfig {
    pub spreadsheet_id: String,
    pub credentials: ServiceAccountCredentials,
    pub token_uri: String,
    pub api_base: String,
}

impl GoogleSheetsConfig {
    pub fn new(spreadsheet_id: impl Into<String>, credentials: ServiceAccountCredentials) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            credentials,
            token_uri: DEFAULT_TOKEN_URI.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct AppendRequest {
    values: Vec<Vec<serde_json::Value>>,
}

/// Google Sheets v4 `values:append` over a service account.
///
/// A fresh access token is fetched for every batch; the handler keeps no state
/// between requests.
pub struct GoogleSheetsClient {
    http: Client,
    config: GoogleSheetsConfig,
}

impl GoogleSheetsClient {
    pub fn new(config: GoogleSheetsConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    async fn access_token(&self) -> Result<String, SheetsError> {
        let assertion = mint_assertion(&self.config.credentials, &self.config.token_uri, Utc::now())
            .map_err(SheetsError::InvalidKey)?;

        let res = self
            .http
            .post(&self.config.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            warn!(%status, "service account token exchange rejected");
            return Err(SheetsError::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = res.json().await?;
        Ok(token.access_token)
    }

    /// Each path segment is percent-encoded, so a range such as `Tab #1!A:G`
    /// stays inside the path.
    fn append_url(&self, range: &str) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.config.api_base)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .extend([
                "v4",
                "spreadsheets",
                self.config.spreadsheet_id.as_str(),
                "values",
                format!("{range}:append").as_str(),
            ]);
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        Ok(url)
    }
}

#[async_trait]
impl SheetAppender for GoogleSheetsClient {
    async fn append_rows(&self, range: &str, rows: &[SheetRow]) -> Result<(), SheetsError> {
        let url = self.append_url(range)?;
        let token = self.access_token().await?;

        let res = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&AppendRequest {
                values: rows.iter().map(SheetRow::cells).collect(),
            })
            .send()
            .await?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(SheetsError::Api {
                status: status.as_u16(),
                body,
            });
        }

        info!(
            spreadsheet_id = %self.config.spreadsheet_id,
            range,
            rows = rows.len(),
            "appended rows to spreadsheet"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/google_tests.rs"]
mod tests;
