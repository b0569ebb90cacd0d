use async_trait::async_trait;
use shared::domain::SheetRow;
use tokio::sync::Mutex;

use crate::{SheetAppender, SheetsError};

/// Process-local sheet for tests. `failing` makes every append error out.
#[derive(Default)]
pub struct InMemorySheet {
    rows: Mutex<Vec<(String, SheetRow)>>,
    append_calls: Mutex<usize>,
    fail_with: Option<String>,
}

impl InMemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sheet whose every append fails without storing anything.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }

    pub async fn rows(&self) -> Vec<SheetRow> {
        self.rows
            .lock()
            .await
            .iter()
            .map(|(_, row)| row.clone())
            .collect()
    }

    pub async fn rows_in(&self, range: &str) -> Vec<SheetRow> {
        self.rows
            .lock()
            .await
            .iter()
            .filter(|(r, _)| r == range)
            .map(|(_, row)| row.clone())
            .collect()
    }

    pub async fn append_calls(&self) -> usize {
        *self.append_calls.lock().await
    }
}

#[async_trait]
impl SheetAppender for InMemorySheet {
    async fn append_rows(&self, range: &str, rows: &[SheetRow]) -> Result<(), SheetsError> {
        *self.append_calls.lock().await += 1;
        if let Some(reason) = &self.fail_with {
            return Err(SheetsError::Refused(reason.clone()));
        }

        let mut stored = self.rows.lock().await;
        stored.extend(rows.iter().cloned().map(|row| (range.to_string(), row)));
        Ok(())
    }
}
