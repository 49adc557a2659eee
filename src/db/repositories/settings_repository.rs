use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use crate::error::AppResult;
use crate::models::settings::AppSettings;

const BASE_SELECT: &str = r#"
    SELECT
        language,
        theme,
        currency,
        has_completed_onboarding,
        active_workplace_id
    FROM app_settings
    WHERE id = 1
"#;

impl TryFrom<&Row<'_>> for AppSettings {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            language: row.get("language")?,
            theme: row.get("theme")?,
            currency: row.get("currency")?,
            has_completed_onboarding: row.get::<_, i64>("has_completed_onboarding")? != 0,
            active_workplace_id: row.get("active_workplace_id")?,
        })
    }
}

/// The settings row is a storage-enforced singleton: `id` is checked to be 1
/// and the row is seeded with the schema, so there is exactly one instance
/// to read and write.
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn get(conn: &Connection) -> AppResult<AppSettings> {
        let mut stmt = conn.prepare(BASE_SELECT)?;

        let row = stmt
            .query_row([], |row| AppSettings::try_from(row))
            .optional()?;

        Ok(row.unwrap_or_default())
    }

    pub fn save(conn: &Connection, settings: &AppSettings) -> AppResult<()> {
        conn.execute(
            r#"
                INSERT INTO app_settings
                    (id, language, theme, currency, has_completed_onboarding, active_workplace_id)
                VALUES
                    (1, :language, :theme, :currency, :has_completed_onboarding, :active_workplace_id)
                ON CONFLICT (id) DO UPDATE SET
                    language = excluded.language,
                    theme = excluded.theme,
                    currency = excluded.currency,
                    has_completed_onboarding = excluded.has_completed_onboarding,
                    active_workplace_id = excluded.active_workplace_id
            "#,
            named_params! {
                ":language": &settings.language,
                ":theme": &settings.theme,
                ":currency": &settings.currency,
                ":has_completed_onboarding": settings.has_completed_onboarding as i64,
                ":active_workplace_id": &settings.active_workplace_id,
            },
        )?;

        Ok(())
    }

    pub fn set_active_workplace(conn: &Connection, workplace_id: Option<&str>) -> AppResult<()> {
        conn.execute(
            "UPDATE app_settings SET active_workplace_id = ?1 WHERE id = 1",
            [workplace_id],
        )?;
        Ok(())
    }

    /// Part of the data-reset contract: the onboarding flag and workplace
    /// selection go back to defaults while language, theme and currency
    /// survive.
    pub fn reset_for_new_data(conn: &Connection) -> AppResult<()> {
        conn.execute(
            "UPDATE app_settings
             SET has_completed_onboarding = 0, active_workplace_id = NULL
             WHERE id = 1",
            [],
        )?;
        Ok(())
    }
}
