use std::{collections::HashMap, fs};

use anyhow::bail;
use server_api::DEFAULT_SHEET_RANGE;
use sheets::{GoogleSheetsConfig, ServiceAccountCredentials, DEFAULT_API_BASE, DEFAULT_TOKEN_URI};

pub struct Settings {
    pub server_bind: String,
    pub sheet_range: String,
    pub spreadsheet_id: Option<String>,
    pub service_account_email: Option<String>,
    pub service_account_private_key: Option<String>,
    pub google_token_uri: String,
    pub sheets_api_base: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:8080".into(),
            sheet_range: DEFAULT_SHEET_RANGE.into(),
            spreadsheet_id: None,
            service_account_email: None,
            service_account_private_key: None,
            google_token_uri: DEFAULT_TOKEN_URI.into(),
            sheets_api_base: DEFAULT_API_BASE.into(),
        }
    }
}

impl Settings {
    /// Presence check only; the key and id are not verified until the first append.
    pub fn sheets_config(&self) -> anyhow::Result<GoogleSheetsConfig> {
        let spreadsheet_id = present(&self.spreadsheet_id);
        let email = present(&self.service_account_email);
        let private_key = present(&self.service_account_private_key);

        let (Some(spreadsheet_id), Some(email), Some(private_key)) = (spreadsheet_id, email, private_key)
        else {
            let missing: Vec<&str> = [
                (spreadsheet_id.is_none(), "GOOGLE_SPREADSHEET_ID"),
                (email.is_none(), "GOOGLE_SERVICE_ACCOUNT_EMAIL"),
                (private_key.is_none(), "GOOGLE_PRIVATE_KEY"),
            ]
            .into_iter()
            .filter_map(|(is_missing, name)| is_missing.then_some(name))
            .collect();
            bail!("missing required configuration: {}", missing.join(", "));
        };

        let mut config = GoogleSheetsConfig::new(
            spreadsheet_id,
            ServiceAccountCredentials::new(email, private_key),
        );
        config.token_uri = self.google_token_uri.clone();
        config.api_base = self.sheets_api_base.clone();
        Ok(config)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };

    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("sheet_range") {
        settings.sheet_range = v.clone();
    }
    if let Some(v) = file_cfg.get("spreadsheet_id") {
        settings.spreadsheet_id = Some(v.clone());
    }
    if let Some(v) = file_cfg.get("service_account_email") {
        settings.service_account_email = Some(v.clone());
    }
}

/// Plain names first, then `APP__*` names which win when both are set.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    let first = |keys: [&str; 2]| keys.into_iter().rev().find_map(&lookup);

    if let Some(v) = first(["SERVER_BIND", "APP__BIND_ADDR"]) {
        settings.server_bind = v;
    }
    if let Some(v) = first(["SHEET_RANGE", "APP__SHEET_RANGE"]) {
        settings.sheet_range = v;
    }
    if let Some(v) = first(["GOOGLE_SPREADSHEET_ID", "APP__SPREADSHEET_ID"]) {
        settings.spreadsheet_id = Some(v);
    }
    if let Some(v) = first(["GOOGLE_SERVICE_ACCOUNT_EMAIL", "APP__SERVICE_ACCOUNT_EMAIL"]) {
        settings.service_account_email = Some(v);
    }
    if let Some(v) = first(["GOOGLE_PRIVATE_KEY", "APP__SERVICE_ACCOUNT_PRIVATE_KEY"]) {
        settings.service_account_private_key = Some(v);
    }
    if let Some(v) = first(["GOOGLE_TOKEN_URI", "APP__GOOGLE_TOKEN_URI"]) {
        settings.google_token_uri = v;
    }
    if let Some(v) = first(["SHEETS_API_BASE", "APP__SHEETS_API_BASE"]) {
        settings.sheets_api_base = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
