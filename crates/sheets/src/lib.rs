//! Spreadsheet collaborator for the RSVP handler.
//!
//! The handler only ever needs one operation: append a batch of rows to a
//! range. [`SheetAppender`] is that seam; [`GoogleSheetsClient`] talks to the
//! Google Sheets v4 API with a service account and [`InMemorySheet`] stands in
//! for it in tests.

use async_trait::async_trait;
use shared::domain::SheetRow;
use thiserror::Error;

mod auth;
mod google;
mod memory;

pub use auth::{mint_assertion, ServiceAccountCredentials, SHEETS_SCOPE};
pub use google::{GoogleSheetsClient, GoogleSheetsConfig, DEFAULT_API_BASE, DEFAULT_TOKEN_URI};
pub use memory::InMemorySheet;

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("service account key rejected: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
    #[error("token exchange failed with status {status}: {body}")]
    Auth { status: u16, body: String },
    #[error("append rejected with status {status}: {body}")]
    Api { status: u16, body: String },
    #[error("spreadsheet request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid spreadsheet endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("append refused: {0}")]
    Refused(String),
}

/// Appends rows to a fixed spreadsheet. Implementations must treat a batch as
/// one call: either every row lands or none do.
#[async_trait]
pub trait SheetAppender: Send + Sync {
    async fn append_rows(&self, range: &str, rows: &[SheetRow]) -> Result<(), SheetsError>;
}
