use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const LANGUAGE_OPTIONS: [&str; 3] = ["en", "ur", "hi"];
pub const THEME_OPTIONS: [&str; 2] = ["light", "dark"];
pub const CURRENCY_OPTIONS: [&str; 5] = ["PKR", "INR", "USD", "EUR", "GBP"];

pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_THEME: &str = "light";
pub const DEFAULT_CURRENCY: &str = "USD";

/// Singleton application settings. Exactly one instance exists for the
/// lifetime of a database; it is created with the schema and only updated.
/// Currency is a display label, never a converted unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub language: String,
    pub theme: String,
    pub currency: String,
    pub has_completed_onboarding: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_workplace_id: Option<String>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            theme: DEFAULT_THEME.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            has_completed_onboarding: false,
            active_workplace_id: None,
        }
    }
}

impl AppSettings {
    pub fn validate(&self) -> AppResult<()> {
        if !LANGUAGE_OPTIONS.contains(&self.language.as_str()) {
            return Err(AppError::validation(format!(
                "unsupported language: {}",
                self.language
            )));
        }
        if !THEME_OPTIONS.contains(&self.theme.as_str()) {
            return Err(AppError::validation(format!(
                "unsupported theme: {}",
                self.theme
            )));
        }
        if !CURRENCY_OPTIONS.contains(&self.currency.as_str()) {
            return Err(AppError::validation(format!(
                "unsupported currency: {}",
                self.currency
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        AppSettings::default().validate().unwrap();
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let settings = AppSettings {
            currency: "BTC".to_string(),
            ..AppSettings::default()
        };
        assert!(settings.validate().is_err());
    }
}
