use std::sync::Arc;

use chrono::{DateTime, Utc};
use sheets::{SheetAppender, SheetsError};
use shared::{
    domain::{batch_timestamp, Guest, SheetRow},
    error::{ErrorCode, ValidationErrors},
    protocol::RSVP_FAILED_MESSAGE,
};
use thiserror::Error;
use tracing::{error, info};

mod validation;

pub use validation::{validate_submission, MISSING_EVENT_MESSAGE};

pub const DEFAULT_SHEET_RANGE: &str = "A:G";

#[derive(Clone)]
pub struct ApiContext {
    pub sheet: Arc<dyn SheetAppender>,
    pub range: String,
}

impl ApiContext {
    pub fn new(sheet: Arc<dyn SheetAppender>) -> Self {
        Self {
            sheet,
            range: DEFAULT_SHEET_RANGE.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("request body is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid form data: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("spreadsheet append failed: {0}")]
    Persistence(#[source] SheetsError),
}

impl SubmissionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SubmissionError::Parse(_) => ErrorCode::Parse,
            SubmissionError::Validation(_) => ErrorCode::Validation,
            SubmissionError::Persistence(_) => ErrorCode::Persistence,
        }
    }

    /// Text safe to return to the caller. Persistence causes stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            SubmissionError::Parse(_) => "Invalid request body: expected JSON".to_string(),
            SubmissionError::Validation(errors) => {
                format!("Invalid form data: {}", errors.summary())
            }
            SubmissionError::Persistence(_) => RSVP_FAILED_MESSAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub rows_appended: usize,
    pub timestamp: Option<String>,
}

/// One row per guest, all stamped with the same instant.
pub fn rows_for_batch(guests: &[Guest], now: DateTime<Utc>) -> Vec<SheetRow> {
    let timestamp = batch_timestamp(now);
    guests
        .iter()
        .map(|guest| SheetRow::from_guest(guest, &timestamp))
        .collect()
}

/// Handles one raw RSVP body: parse, validate, flatten, append.
///
/// Each step short-circuits on failure and nothing is retried. An empty guest
/// list is accepted without touching the sheet.
pub async fn submit_rsvp(ctx: &ApiContext, body: &[u8]) -> Result<SubmissionReceipt, SubmissionError> {
    let value: serde_json::Value = serde_json::from_slice(body)?;
    let guests = validate_submission(&value)?;

    if guests.is_empty() {
        info!("empty rsvp submission accepted without append");
        return Ok(SubmissionReceipt {
            rows_appended: 0,
            timestamp: None,
        });
    }

    let rows = rows_for_batch(&guests, Utc::now());
    ctx.sheet
        .append_rows(&ctx.range, &rows)
        .await
        .map_err(|source| {
            error!(range = %ctx.range, rows = rows.len(), %source, "failed to append rsvp rows");
            SubmissionError::Persistence(source)
        })?;

    let accepted = guests.iter().filter(|guest| guest.rsvp).count();
    info!(
        guests = rows.len(),
        accepted,
        declined = rows.len() - accepted,
        "rsvp recorded"
    );
    Ok(SubmissionReceipt {
        rows_appended: rows.len(),
        timestamp: rows.first().map(|row| row.timestamp.clone()),
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
