use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::db::repositories::attendance_repository::AttendanceRepository;
use crate::db::repositories::labor_repository::LaborRepository;
use crate::db::repositories::payment_repository::PaymentRepository;
use crate::db::repositories::settings_repository::SettingsRepository;
use crate::db::repositories::workplace_repository::WorkplaceRepository;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::backup::{BackupDocument, BACKUP_SCHEMA_VERSION};
use crate::models::workplace::Workplace;

/// Serializes the whole store to one portable JSON document and restores
/// from such documents. Import and reset replace state inside a single
/// transaction; a failure part-way through leaves the store untouched.
#[derive(Clone)]
pub struct BackupService {
    db: DbPool,
}

impl BackupService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Complete, lossless snapshot: every collection with ids and
    /// timestamps intact, plus settings, an export timestamp and the
    /// schema version tag.
    pub fn export_json(&self) -> AppResult<String> {
        let document = self.db.with_connection(|conn| {
            Ok(BackupDocument {
                workplaces: WorkplaceRepository::list(conn)?,
                labors: LaborRepository::list(conn)?,
                attendance: AttendanceRepository::list(conn)?,
                payments: PaymentRepository::list(conn)?,
                settings: Some(SettingsRepository::get(conn)?),
                export_date: Some(Utc::now()),
                version: Some(BACKUP_SCHEMA_VERSION.to_string()),
            })
        })?;

        info!(
            target: "app::backup",
            workplaces = document.workplaces.len(),
            labors = document.labors.len(),
            attendance = document.attendance.len(),
            payments = document.payments.len(),
            "exported backup document"
        );

        serde_json::to_string_pretty(&document).map_err(Into::into)
    }

    /// Replaces (not merges) all stored entities with the document's
    /// contents. Collections absent from the document import as empty;
    /// settings are only overwritten when present.
    pub fn import_json(&self, json: &str) -> AppResult<()> {
        let mut document: BackupDocument = serde_json::from_str(json)?;
        adopt_legacy_document(&mut document);

        self.db.with_transaction(|tx| {
            PaymentRepository::delete_all(tx)?;
            AttendanceRepository::delete_all(tx)?;
            LaborRepository::delete_all(tx)?;
            WorkplaceRepository::delete_all(tx)?;

            for workplace in &document.workplaces {
                WorkplaceRepository::insert(tx, workplace)?;
            }
            for labor in &document.labors {
                LaborRepository::insert(tx, labor)?;
            }
            for record in &document.attendance {
                AttendanceRepository::upsert(tx, record)?;
            }
            for payment in &document.payments {
                PaymentRepository::insert(tx, payment)?;
            }
            if let Some(settings) = &document.settings {
                settings.validate()?;
                SettingsRepository::save(tx, settings)?;
            }

            Ok(())
        })?;

        info!(
            target: "app::backup",
            workplaces = document.workplaces.len(),
            labors = document.labors.len(),
            attendance = document.attendance.len(),
            payments = document.payments.len(),
            version = document.version.as_deref().unwrap_or("unversioned"),
            "imported backup document"
        );

        Ok(())
    }

    /// Clears every entity collection and returns the onboarding flag and
    /// workplace selection to their defaults. Language, theme and currency
    /// settings survive the reset.
    pub fn reset(&self) -> AppResult<()> {
        self.db.with_transaction(|tx| {
            PaymentRepository::delete_all(tx)?;
            AttendanceRepository::delete_all(tx)?;
            LaborRepository::delete_all(tx)?;
            WorkplaceRepository::delete_all(tx)?;
            SettingsRepository::reset_for_new_data(tx)
        })?;

        info!(target: "app::backup", "reset all data");
        Ok(())
    }
}

/// Documents written before workplaces existed carry records without a
/// `workplaceId`. Instead of rejecting them, attach everything to a fresh
/// default workplace, mirroring what the schema migration does for legacy
/// databases.
fn adopt_legacy_document(document: &mut BackupDocument) {
    let has_records = !document.labors.is_empty()
        || !document.attendance.is_empty()
        || !document.payments.is_empty();
    if !document.workplaces.is_empty() || !has_records {
        return;
    }

    let workplace = Workplace {
        id: Uuid::new_v4().to_string(),
        name: "Default Workplace".to_string(),
        description: None,
        is_active: true,
        created_at: Utc::now(),
    };
    let workplace_id = workplace.id.clone();

    for labor in &mut document.labors {
        if labor.workplace_id.is_empty() {
            labor.workplace_id = workplace_id.clone();
        }
    }
    for record in &mut document.attendance {
        if record.workplace_id.is_empty() {
            record.workplace_id = workplace_id.clone();
        }
    }
    for payment in &mut document.payments {
        if payment.workplace_id.is_empty() {
            payment.workplace_id = workplace_id.clone();
        }
    }
    if let Some(settings) = document.settings.as_mut() {
        settings.active_workplace_id = Some(workplace_id.clone());
    }
    document.workplaces.push(workplace);

    info!(
        target: "app::backup",
        workplace_id = %workplace_id,
        "adopted legacy backup document under a default workplace"
    );
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::*;
    use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
    use crate::models::labor::Labor;
    use crate::models::payment::{PaymentRecord, PaymentType};
    use crate::models::settings::AppSettings;

    fn setup_service() -> (BackupService, DbPool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = DbPool::new(temp_dir.path().join("backup.sqlite")).unwrap();
        (BackupService::new(pool.clone()), pool, temp_dir)
    }

    fn seed_store(pool: &DbPool) {
        let workplace = Workplace {
            id: "wp1".to_string(),
            name: "Site A".to_string(),
            description: Some("east wing".to_string()),
            is_active: true,
            created_at: Utc::now(),
        };
        let labor = Labor {
            id: "l1".to_string(),
            workplace_id: "wp1".to_string(),
            name: "Akbar".to_string(),
            phone: "0300-1234567".to_string(),
            daily_wage: Decimal::from(1000),
            created_at: Utc::now(),
        };
        let record = AttendanceRecord {
            id: "a1".to_string(),
            workplace_id: "wp1".to_string(),
            labor_id: "l1".to_string(),
            date: "2024-01-01".parse().unwrap(),
            status: AttendanceStatus::Present,
            wage: Decimal::from(1000),
            created_at: Utc::now(),
        };
        let payment = PaymentRecord {
            id: "p1".to_string(),
            workplace_id: "wp1".to_string(),
            labor_id: "l1".to_string(),
            amount: Decimal::from(300),
            date: "2024-01-02".parse().unwrap(),
            payment_type: PaymentType::Partial,
            notes: Some("advance".to_string()),
            created_at: Utc::now(),
        };

        pool.with_connection(|conn| {
            WorkplaceRepository::insert(conn, &workplace)?;
            LaborRepository::insert(conn, &labor)?;
            AttendanceRepository::upsert(conn, &record)?;
            PaymentRepository::insert(conn, &payment)?;
            SettingsRepository::set_active_workplace(conn, Some("wp1"))
        })
        .unwrap();
    }

    #[test]
    fn export_import_round_trip_preserves_every_collection() {
        let (service, pool, _guard) = setup_service();
        seed_store(&pool);

        let json = service.export_json().unwrap();

        let restore_dir = TempDir::new().unwrap();
        let restore_pool = DbPool::new(restore_dir.path().join("restore.sqlite")).unwrap();
        let restore = BackupService::new(restore_pool.clone());
        restore.import_json(&json).unwrap();

        let (workplaces, labors, attendance, payments, settings) = restore_pool
            .with_connection(|conn| {
                Ok((
                    WorkplaceRepository::list(conn)?,
                    LaborRepository::list(conn)?,
                    AttendanceRepository::list(conn)?,
                    PaymentRepository::list(conn)?,
                    SettingsRepository::get(conn)?,
                ))
            })
            .unwrap();

        assert_eq!(workplaces.len(), 1);
        assert_eq!(workplaces[0].id, "wp1");
        assert_eq!(workplaces[0].description.as_deref(), Some("east wing"));
        assert_eq!(labors.len(), 1);
        assert_eq!(labors[0].daily_wage, Decimal::from(1000));
        assert_eq!(attendance.len(), 1);
        assert_eq!(attendance[0].status, AttendanceStatus::Present);
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].notes.as_deref(), Some("advance"));
        assert_eq!(settings.active_workplace_id.as_deref(), Some("wp1"));
    }

    #[test]
    fn export_tags_schema_version() {
        let (service, _pool, _guard) = setup_service();
        let json = service.export_json().unwrap();
        let document: BackupDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(document.version.as_deref(), Some(BACKUP_SCHEMA_VERSION));
        assert!(document.export_date.is_some());
        assert!(document.workplaces.is_empty());
    }

    #[test]
    fn legacy_document_is_adopted_under_default_workplace() {
        let (service, pool, _guard) = setup_service();

        let json = r#"{
            "labors": [
                {"id": "l1", "name": "Akbar", "phone": "0300-1234567",
                 "dailyWage": 500, "createdAt": "2023-06-01T08:00:00Z"}
            ],
            "attendance": [
                {"id": "a1", "laborId": "l1", "date": "2023-06-02",
                 "status": "half", "wage": 250, "createdAt": "2023-06-02T08:00:00Z"}
            ],
            "payments": [],
            "settings": {"language": "ur", "theme": "dark", "currency": "PKR",
                         "hasCompletedOnboarding": true},
            "exportDate": "2023-06-03T08:00:00Z",
            "version": "1.0"
        }"#;

        service.import_json(json).unwrap();

        let (workplaces, labors, attendance, settings) = pool
            .with_connection(|conn| {
                Ok((
                    WorkplaceRepository::list(conn)?,
                    LaborRepository::list(conn)?,
                    AttendanceRepository::list(conn)?,
                    SettingsRepository::get(conn)?,
                ))
            })
            .unwrap();

        assert_eq!(workplaces.len(), 1);
        assert_eq!(workplaces[0].name, "Default Workplace");
        assert_eq!(labors.len(), 1);
        assert_eq!(labors[0].workplace_id, workplaces[0].id);
        assert_eq!(attendance[0].workplace_id, workplaces[0].id);
        assert_eq!(attendance[0].wage, Decimal::from(250));
        assert_eq!(settings.language, "ur");
        assert_eq!(
            settings.active_workplace_id.as_deref(),
            Some(workplaces[0].id.as_str())
        );
    }

    #[test]
    fn unknown_fields_are_tolerated() {
        let (service, pool, _guard) = setup_service();

        let json = r#"{
            "workplaces": [
                {"id": "wp9", "name": "Site B", "isActive": true,
                 "createdAt": "2024-01-01T00:00:00Z"}
            ],
            "futureCollection": [{"anything": 1}],
            "exportDate": "2024-01-01T00:00:00Z",
            "version": "3.0"
        }"#;

        service.import_json(json).unwrap();

        let workplaces = pool
            .with_connection(|conn| WorkplaceRepository::list(conn))
            .unwrap();
        assert_eq!(workplaces.len(), 1);
        assert_eq!(workplaces[0].id, "wp9");
    }

    #[test]
    fn malformed_document_is_an_import_parse_error() {
        let (service, _pool, _guard) = setup_service();
        let err = service.import_json("this is not json").unwrap_err();
        assert!(matches!(err, crate::error::AppError::ImportParse(_)));
    }

    #[test]
    fn failed_import_rolls_back_to_previous_state() {
        let (service, pool, _guard) = setup_service();
        seed_store(&pool);

        // The payment references a labor that the document never defines,
        // so the insert trips the foreign key after the old data is gone.
        let json = r#"{
            "workplaces": [
                {"id": "wp2", "name": "Site B", "isActive": true,
                 "createdAt": "2024-01-01T00:00:00Z"}
            ],
            "payments": [
                {"id": "p9", "workplaceId": "wp2", "laborId": "ghost",
                 "amount": 100, "date": "2024-01-05", "type": "daily",
                 "createdAt": "2024-01-05T00:00:00Z"}
            ],
            "exportDate": "2024-01-06T00:00:00Z",
            "version": "2.0"
        }"#;

        let err = service.import_json(json).unwrap_err();
        assert!(matches!(err, crate::error::AppError::ForeignKey { .. }));

        let (workplaces, labors, payments) = pool
            .with_connection(|conn| {
                Ok((
                    WorkplaceRepository::list(conn)?,
                    LaborRepository::list(conn)?,
                    PaymentRepository::list(conn)?,
                ))
            })
            .unwrap();
        assert_eq!(workplaces.len(), 1);
        assert_eq!(workplaces[0].id, "wp1");
        assert_eq!(labors.len(), 1);
        assert_eq!(payments.len(), 1);
    }

    #[test]
    fn reset_clears_collections_and_keeps_display_settings() {
        let (service, pool, _guard) = setup_service();
        seed_store(&pool);
        pool.with_connection(|conn| {
            SettingsRepository::save(
                conn,
                &AppSettings {
                    language: "hi".to_string(),
                    currency: "INR".to_string(),
                    has_completed_onboarding: true,
                    active_workplace_id: Some("wp1".to_string()),
                    ..AppSettings::default()
                },
            )
        })
        .unwrap();

        service.reset().unwrap();

        let (workplaces, labors, attendance, payments, settings) = pool
            .with_connection(|conn| {
                Ok((
                    WorkplaceRepository::list(conn)?,
                    LaborRepository::list(conn)?,
                    AttendanceRepository::list(conn)?,
                    PaymentRepository::list(conn)?,
                    SettingsRepository::get(conn)?,
                ))
            })
            .unwrap();

        assert!(workplaces.is_empty());
        assert!(labors.is_empty());
        assert!(attendance.is_empty());
        assert!(payments.is_empty());
        assert_eq!(settings.language, "hi");
        assert_eq!(settings.currency, "INR");
        assert!(!settings.has_completed_onboarding);
        assert!(settings.active_workplace_id.is_none());
    }
}
