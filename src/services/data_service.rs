use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use chrono::{Local, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::repositories::attendance_repository::AttendanceRepository;
use crate::db::repositories::labor_repository::LaborRepository;
use crate::db::repositories::payment_repository::PaymentRepository;
use crate::db::repositories::settings_repository::SettingsRepository;
use crate::db::repositories::workplace_repository::WorkplaceRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::labor::{Labor, LaborCreateInput, LaborUpdateInput};
use crate::models::payment::{PaymentCreateInput, PaymentRecord, PaymentUpdateInput};
use crate::models::report::{DashboardStats, LaborSummary, ReportFilters, ReportSummary};
use crate::models::settings::AppSettings;
use crate::models::workplace::{Workplace, WorkplaceCreateInput, WorkplaceUpdateInput};
use crate::services::backup_service::BackupService;
use crate::services::calculations;

const DEFAULT_WORKPLACE_NAME: &str = "Default Workplace";

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{4,19}$").expect("phone pattern"));

/// In-memory view of the active workplace's data plus the derived dashboard
/// numbers. Labors, attendance and payments are already scoped to the
/// active workplace; other workplaces' records never appear here.
#[derive(Debug, Clone, Default)]
pub struct DataSnapshot {
    pub workplaces: Vec<Workplace>,
    pub active_workplace: Option<Workplace>,
    pub labors: Vec<Labor>,
    pub attendance_records: Vec<AttendanceRecord>,
    pub payment_records: Vec<PaymentRecord>,
    pub settings: AppSettings,
    pub dashboard_stats: DashboardStats,
}

/// Mediates between the UI and the store: every mutation validates its
/// preconditions, writes through a repository, reloads the snapshot and
/// recomputes the dashboard. Callers read cloned state, never live rows.
pub struct DataService {
    db: DbPool,
    backup: BackupService,
    snapshot: RwLock<DataSnapshot>,
    loading: AtomicBool,
}

impl DataService {
    pub fn new(db: DbPool) -> Self {
        Self {
            backup: BackupService::new(db.clone()),
            db,
            snapshot: RwLock::new(DataSnapshot::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// First load. On a fresh install (no workplaces, onboarding not done)
    /// a default workplace is seeded so the user can start recording
    /// immediately. Deleting the last workplace mid-session does not
    /// recreate it.
    pub fn initialize(&self) -> AppResult<()> {
        self.refresh_data()?;

        let needs_default = {
            let snapshot = self.read_snapshot();
            snapshot.workplaces.is_empty() && !snapshot.settings.has_completed_onboarding
        };
        if needs_default {
            info!(target: "app::data", "seeding default workplace on first launch");
            self.add_workplace(WorkplaceCreateInput {
                name: DEFAULT_WORKPLACE_NAME.to_string(),
                description: None,
            })?;
        }

        Ok(())
    }

    /// Reloads everything from the store, re-runs the active-workplace
    /// selection policy and recomputes dashboard stats for the local
    /// calendar date.
    pub fn refresh_data(&self) -> AppResult<()> {
        self.loading.store(true, Ordering::SeqCst);
        let loaded = self.load_snapshot();
        self.loading.store(false, Ordering::SeqCst);

        let snapshot = loaded?;
        debug!(
            target: "app::data",
            workplaces = snapshot.workplaces.len(),
            labors = snapshot.labors.len(),
            attendance = snapshot.attendance_records.len(),
            payments = snapshot.payment_records.len(),
            "snapshot refreshed"
        );

        if let Ok(mut guard) = self.snapshot.write() {
            *guard = snapshot;
        }
        Ok(())
    }

    fn load_snapshot(&self) -> AppResult<DataSnapshot> {
        let (workplaces, mut settings, all_labors, all_attendance, all_payments) =
            self.db.with_connection(|conn| {
                Ok((
                    WorkplaceRepository::list(conn)?,
                    SettingsRepository::get(conn)?,
                    LaborRepository::list(conn)?,
                    AttendanceRepository::list(conn)?,
                    PaymentRepository::list(conn)?,
                ))
            })?;

        // Selection policy: keep the persisted workplace when it still
        // exists, otherwise fall back to the head of the store's default
        // ordering (or none at all) and persist that choice.
        let selected = settings
            .active_workplace_id
            .as_ref()
            .and_then(|id| workplaces.iter().find(|workplace| &workplace.id == id))
            .cloned();
        let active_workplace = match selected {
            Some(workplace) => Some(workplace),
            None => {
                let fallback = workplaces.first().cloned();
                let fallback_id = fallback.as_ref().map(|workplace| workplace.id.clone());
                if settings.active_workplace_id != fallback_id {
                    info!(
                        target: "app::data",
                        workplace_id = fallback_id.as_deref().unwrap_or("none"),
                        "re-selecting active workplace"
                    );
                    self.db.with_connection(|conn| {
                        SettingsRepository::set_active_workplace(conn, fallback_id.as_deref())
                    })?;
                    settings.active_workplace_id = fallback_id;
                }
                fallback
            }
        };

        let (labors, attendance_records, payment_records) = match &active_workplace {
            Some(active) => (
                all_labors
                    .into_iter()
                    .filter(|labor| labor.workplace_id == active.id)
                    .collect(),
                all_attendance
                    .into_iter()
                    .filter(|record| record.workplace_id == active.id)
                    .collect(),
                all_payments
                    .into_iter()
                    .filter(|payment| payment.workplace_id == active.id)
                    .collect(),
            ),
            None => (Vec::new(), Vec::new(), Vec::new()),
        };

        let dashboard_stats = calculations::dashboard_stats(
            &labors,
            &attendance_records,
            &payment_records,
            today(),
        );

        Ok(DataSnapshot {
            workplaces,
            active_workplace,
            labors,
            attendance_records,
            payment_records,
            settings,
            dashboard_stats,
        })
    }

    // Read accessors. Clones of the last refreshed snapshot.

    pub fn workplaces(&self) -> Vec<Workplace> {
        self.read_snapshot().workplaces
    }

    pub fn active_workplace(&self) -> Option<Workplace> {
        self.read_snapshot().active_workplace
    }

    pub fn labors(&self) -> Vec<Labor> {
        self.read_snapshot().labors
    }

    pub fn attendance_records(&self) -> Vec<AttendanceRecord> {
        self.read_snapshot().attendance_records
    }

    pub fn payment_records(&self) -> Vec<PaymentRecord> {
        self.read_snapshot().payment_records
    }

    pub fn settings(&self) -> AppSettings {
        self.read_snapshot().settings
    }

    pub fn dashboard_stats(&self) -> DashboardStats {
        self.read_snapshot().dashboard_stats
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Lifetime totals for one labor of the active workplace.
    pub fn labor_summary(&self, labor_id: &str) -> AppResult<LaborSummary> {
        let snapshot = self.read_snapshot();
        let labor = snapshot
            .labors
            .iter()
            .find(|labor| labor.id == labor_id)
            .ok_or_else(AppError::not_found)?;
        Ok(calculations::labor_summary(
            labor,
            &snapshot.attendance_records,
            &snapshot.payment_records,
        ))
    }

    /// Period report over the active workplace's records.
    pub fn report_summary(&self, filters: &ReportFilters) -> ReportSummary {
        let snapshot = self.read_snapshot();
        calculations::report_summary(
            &snapshot.labors,
            &snapshot.attendance_records,
            &snapshot.payment_records,
            filters,
            today(),
        )
    }

    // Workplace mutations.

    pub fn add_workplace(&self, input: WorkplaceCreateInput) -> AppResult<Workplace> {
        let workplace = Workplace {
            id: Uuid::new_v4().to_string(),
            name: normalize_name(&input.name)?,
            description: normalize_optional(input.description),
            is_active: true,
            created_at: Utc::now(),
        };

        self.db
            .with_connection(|conn| WorkplaceRepository::insert(conn, &workplace))?;
        info!(target: "app::data", workplace_id = %workplace.id, "workplace created");
        self.refresh_data()?;
        Ok(workplace)
    }

    pub fn update_workplace(&self, id: &str, input: WorkplaceUpdateInput) -> AppResult<Workplace> {
        let mut workplace = self
            .db
            .with_connection(|conn| WorkplaceRepository::find_by_id(conn, id))?
            .ok_or_else(AppError::not_found)?;

        if let Some(name) = input.name {
            workplace.name = normalize_name(&name)?;
        }
        if let Some(description) = input.description {
            workplace.description = normalize_optional(description);
        }
        if let Some(is_active) = input.is_active {
            workplace.is_active = is_active;
        }

        self.db
            .with_connection(|conn| WorkplaceRepository::update(conn, &workplace))?;
        info!(target: "app::data", workplace_id = %workplace.id, "workplace updated");
        self.refresh_data()?;
        Ok(workplace)
    }

    /// Removes the workplace and, through the store's cascade rules, every
    /// labor, attendance record and payment under it. If it was the active
    /// workplace the refresh re-selects another one (or none).
    pub fn delete_workplace(&self, id: &str) -> AppResult<()> {
        self.db
            .with_connection(|conn| WorkplaceRepository::delete(conn, id))?;
        info!(target: "app::data", workplace_id = %id, "workplace deleted");
        self.refresh_data()
    }

    pub fn set_active_workplace(&self, id: &str) -> AppResult<()> {
        self.db.with_connection(|conn| {
            WorkplaceRepository::find_by_id(conn, id)?.ok_or_else(AppError::not_found)?;
            SettingsRepository::set_active_workplace(conn, Some(id))
        })?;
        info!(target: "app::data", workplace_id = %id, "active workplace changed");
        self.refresh_data()
    }

    // Labor mutations. All require an active workplace.

    pub fn add_labor(&self, input: LaborCreateInput) -> AppResult<Labor> {
        let active = self.active_workplace_required()?;
        ensure_positive_wage(input.daily_wage)?;

        let labor = Labor {
            id: Uuid::new_v4().to_string(),
            workplace_id: active.id,
            name: normalize_name(&input.name)?,
            phone: normalize_phone(&input.phone)?,
            daily_wage: input.daily_wage,
            created_at: Utc::now(),
        };

        self.db
            .with_connection(|conn| LaborRepository::insert(conn, &labor))?;
        info!(target: "app::data", labor_id = %labor.id, "labor created");
        self.refresh_data()?;
        Ok(labor)
    }

    pub fn update_labor(&self, id: &str, input: LaborUpdateInput) -> AppResult<Labor> {
        let mut labor = self.scoped_labor(id)?;

        if let Some(name) = input.name {
            labor.name = normalize_name(&name)?;
        }
        if let Some(phone) = input.phone {
            labor.phone = normalize_phone(&phone)?;
        }
        if let Some(daily_wage) = input.daily_wage {
            ensure_positive_wage(daily_wage)?;
            labor.daily_wage = daily_wage;
        }

        self.db
            .with_connection(|conn| LaborRepository::update(conn, &labor))?;
        info!(target: "app::data", labor_id = %labor.id, "labor updated");
        self.refresh_data()?;
        Ok(labor)
    }

    /// Cascades to the labor's attendance and payment records.
    pub fn delete_labor(&self, id: &str) -> AppResult<()> {
        let labor = self.scoped_labor(id)?;
        self.db
            .with_connection(|conn| LaborRepository::delete(conn, &labor.id))?;
        info!(target: "app::data", labor_id = %id, "labor deleted");
        self.refresh_data()
    }

    // Attendance.

    /// Marks attendance for one labor and day. The wage is snapshotted from
    /// the labor's current daily wage; marking the same day again replaces
    /// the earlier record, so the second status wins.
    pub fn mark_attendance(
        &self,
        labor_id: &str,
        date: NaiveDate,
        status: AttendanceStatus,
    ) -> AppResult<AttendanceRecord> {
        let labor = self.scoped_labor(labor_id)?;

        let record = AttendanceRecord {
            id: Uuid::new_v4().to_string(),
            workplace_id: labor.workplace_id.clone(),
            labor_id: labor.id.clone(),
            date,
            status,
            wage: calculations::wage_for(labor.daily_wage, status),
            created_at: Utc::now(),
        };

        self.db
            .with_connection(|conn| AttendanceRepository::upsert(conn, &record))?;
        info!(
            target: "app::data",
            labor_id = %record.labor_id,
            date = %record.date,
            status = %record.status,
            "attendance marked"
        );
        self.refresh_data()?;
        Ok(record)
    }

    // Payments.

    pub fn add_payment(&self, input: PaymentCreateInput) -> AppResult<PaymentRecord> {
        ensure_positive_amount(input.amount)?;
        let labor = self.scoped_labor(&input.labor_id)?;

        let payment = PaymentRecord {
            id: Uuid::new_v4().to_string(),
            workplace_id: labor.workplace_id.clone(),
            labor_id: labor.id.clone(),
            amount: input.amount,
            date: input.date,
            payment_type: input.payment_type,
            notes: normalize_optional(input.notes),
            created_at: Utc::now(),
        };

        self.db
            .with_connection(|conn| PaymentRepository::insert(conn, &payment))?;
        info!(target: "app::data", payment_id = %payment.id, "payment recorded");
        self.refresh_data()?;
        Ok(payment)
    }

    pub fn update_payment(&self, id: &str, input: PaymentUpdateInput) -> AppResult<PaymentRecord> {
        let active = self.active_workplace_required()?;
        let mut payment = self
            .db
            .with_connection(|conn| PaymentRepository::find_by_id(conn, id))?
            .filter(|payment| payment.workplace_id == active.id)
            .ok_or_else(AppError::not_found)?;

        if let Some(amount) = input.amount {
            ensure_positive_amount(amount)?;
            payment.amount = amount;
        }
        if let Some(date) = input.date {
            payment.date = date;
        }
        if let Some(payment_type) = input.payment_type {
            payment.payment_type = payment_type;
        }
        if let Some(notes) = input.notes {
            payment.notes = normalize_optional(notes);
        }

        self.db
            .with_connection(|conn| PaymentRepository::update(conn, &payment))?;
        info!(target: "app::data", payment_id = %payment.id, "payment updated");
        self.refresh_data()?;
        Ok(payment)
    }

    pub fn delete_payment(&self, id: &str) -> AppResult<()> {
        let active = self.active_workplace_required()?;
        self.db
            .with_connection(|conn| PaymentRepository::find_by_id(conn, id))?
            .filter(|payment| payment.workplace_id == active.id)
            .ok_or_else(AppError::not_found)?;

        self.db
            .with_connection(|conn| PaymentRepository::delete(conn, id))?;
        info!(target: "app::data", payment_id = %id, "payment deleted");
        self.refresh_data()
    }

    // Settings.

    pub fn update_settings(&self, settings: AppSettings) -> AppResult<AppSettings> {
        settings.validate()?;
        self.db
            .with_connection(|conn| SettingsRepository::save(conn, &settings))?;
        info!(target: "app::data", "settings updated");
        self.refresh_data()?;
        Ok(settings)
    }

    // Backup, restore, reset.

    pub fn export_data(&self) -> AppResult<String> {
        self.backup.export_json()
    }

    pub fn import_data(&self, json: &str) -> AppResult<()> {
        self.backup.import_json(json)?;
        self.refresh_data()
    }

    pub fn reset_all_data(&self) -> AppResult<()> {
        self.backup.reset()?;
        self.refresh_data()
    }

    // Internals.

    fn read_snapshot(&self) -> DataSnapshot {
        self.snapshot
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn active_workplace_required(&self) -> AppResult<Workplace> {
        self.active_workplace()
            .ok_or_else(AppError::no_active_workplace)
    }

    /// Looks the labor up in the store and checks it belongs to the active
    /// workplace; records from other workplaces are invisible here.
    fn scoped_labor(&self, labor_id: &str) -> AppResult<Labor> {
        let active = self.active_workplace_required()?;
        self.db
            .with_connection(|conn| LaborRepository::find_by_id(conn, labor_id))?
            .filter(|labor| labor.workplace_id == active.id)
            .ok_or_else(AppError::not_found)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn normalize_name(value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn normalize_phone(value: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if !PHONE_PATTERN.is_match(trimmed) {
        return Err(AppError::validation(format!(
            "phone number looks invalid: {trimmed}"
        )));
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn ensure_positive_wage(value: Decimal) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::invalid_wage(format!(
            "daily wage must be positive, got {value}"
        )));
    }
    Ok(())
}

fn ensure_positive_amount(value: Decimal) -> AppResult<()> {
    if value <= Decimal::ZERO {
        return Err(AppError::invalid_amount(format!(
            "payment amount must be positive, got {value}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::models::payment::PaymentType;

    fn setup_service() -> (DataService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let pool = DbPool::new(temp_dir.path().join("data.sqlite")).unwrap();
        let service = DataService::new(pool);
        service.initialize().unwrap();
        (service, temp_dir)
    }

    fn sample_labor(service: &DataService, name: &str, wage: i64) -> Labor {
        service
            .add_labor(LaborCreateInput {
                name: name.to_string(),
                phone: "0300-1234567".to_string(),
                daily_wage: Decimal::from(wage),
            })
            .unwrap()
    }

    #[test]
    fn initialize_seeds_default_workplace() {
        let (service, _guard) = setup_service();

        let workplaces = service.workplaces();
        assert_eq!(workplaces.len(), 1);
        assert_eq!(workplaces[0].name, DEFAULT_WORKPLACE_NAME);

        let active = service.active_workplace().unwrap();
        assert_eq!(active.id, workplaces[0].id);
        assert_eq!(
            service.settings().active_workplace_id.as_deref(),
            Some(active.id.as_str())
        );
    }

    #[test]
    fn add_labor_without_workplace_fails() {
        let (service, _guard) = setup_service();
        let workplace = service.active_workplace().unwrap();
        service.delete_workplace(&workplace.id).unwrap();

        assert!(service.active_workplace().is_none());
        let err = service
            .add_labor(LaborCreateInput {
                name: "Akbar".to_string(),
                phone: "0300-1234567".to_string(),
                daily_wage: Decimal::from(1000),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::NoActiveWorkplace));
    }

    #[test]
    fn marking_attendance_twice_keeps_one_record_with_latest_status() {
        let (service, _guard) = setup_service();
        let labor = sample_labor(&service, "Akbar", 1000);
        let date: NaiveDate = "2024-01-01".parse().unwrap();

        let first = service
            .mark_attendance(&labor.id, date, AttendanceStatus::Present)
            .unwrap();
        assert_eq!(first.wage, Decimal::from(1000));

        service
            .mark_attendance(&labor.id, date, AttendanceStatus::Half)
            .unwrap();

        let records = service.attendance_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, AttendanceStatus::Half);
        assert_eq!(records[0].wage, Decimal::from(500));
    }

    #[test]
    fn summary_reflects_attendance_and_payments() {
        let (service, _guard) = setup_service();
        let labor = sample_labor(&service, "Akbar", 1000);

        service
            .mark_attendance(
                &labor.id,
                "2024-01-01".parse().unwrap(),
                AttendanceStatus::Present,
            )
            .unwrap();
        service
            .mark_attendance(
                &labor.id,
                "2024-01-01".parse().unwrap(),
                AttendanceStatus::Half,
            )
            .unwrap();
        service
            .add_payment(PaymentCreateInput {
                labor_id: labor.id.clone(),
                amount: Decimal::from(300),
                date: "2024-01-02".parse().unwrap(),
                payment_type: PaymentType::Partial,
                notes: None,
            })
            .unwrap();

        let summary = service.labor_summary(&labor.id).unwrap();
        assert_eq!(summary.total_earned, Decimal::from(500));
        assert_eq!(summary.total_paid, Decimal::from(300));
        assert_eq!(summary.pending_balance, Decimal::from(200));
    }

    #[test]
    fn wage_change_does_not_rewrite_history() {
        let (service, _guard) = setup_service();
        let labor = sample_labor(&service, "Akbar", 1000);
        let date: NaiveDate = "2024-01-01".parse().unwrap();

        service
            .mark_attendance(&labor.id, date, AttendanceStatus::Present)
            .unwrap();
        service
            .update_labor(
                &labor.id,
                LaborUpdateInput {
                    daily_wage: Some(Decimal::from(1500)),
                    ..LaborUpdateInput::default()
                },
            )
            .unwrap();

        let records = service.attendance_records();
        assert_eq!(records[0].wage, Decimal::from(1000));

        // New marks pick up the new rate.
        service
            .mark_attendance(
                &labor.id,
                "2024-01-02".parse().unwrap(),
                AttendanceStatus::Present,
            )
            .unwrap();
        let records = service.attendance_records();
        let new_mark = records
            .iter()
            .find(|record| record.date == "2024-01-02".parse::<NaiveDate>().unwrap())
            .unwrap();
        assert_eq!(new_mark.wage, Decimal::from(1500));
    }

    #[test]
    fn dashboard_counts_todays_marks() {
        let (service, _guard) = setup_service();
        let first = sample_labor(&service, "Akbar", 1000);
        let second = sample_labor(&service, "Bilal", 800);
        let third = sample_labor(&service, "Chand", 600);
        let today = Local::now().date_naive();

        service
            .mark_attendance(&first.id, today, AttendanceStatus::Present)
            .unwrap();
        service
            .mark_attendance(&second.id, today, AttendanceStatus::Present)
            .unwrap();
        service
            .mark_attendance(&third.id, today, AttendanceStatus::Absent)
            .unwrap();

        let stats = service.dashboard_stats();
        assert_eq!(stats.total_labors, 3);
        assert_eq!(stats.present_today, 2);
        assert_eq!(stats.absent_today, 1);
        assert_eq!(stats.half_day_today, 0);
        assert_eq!(stats.total_pending_amount, Decimal::from(1800));
    }

    #[test]
    fn deleting_active_workplace_falls_back_to_remaining_one() {
        let (service, _guard) = setup_service();
        let original = service.active_workplace().unwrap();
        let second = service
            .add_workplace(WorkplaceCreateInput {
                name: "Site B".to_string(),
                description: None,
            })
            .unwrap();

        service.set_active_workplace(&second.id).unwrap();
        assert_eq!(service.active_workplace().unwrap().id, second.id);

        service.delete_workplace(&second.id).unwrap();

        let active = service.active_workplace().unwrap();
        assert_eq!(active.id, original.id);
        assert_eq!(
            service.settings().active_workplace_id.as_deref(),
            Some(original.id.as_str())
        );
    }

    #[test]
    fn dangling_active_workplace_id_is_repaired_on_refresh() {
        let (service, _guard) = setup_service();
        let workplace = service.active_workplace().unwrap();

        // Plant a pointer to a workplace that does not exist, bypassing the
        // foreign key so the situation matches a corrupted settings row.
        service
            .db
            .with_connection(|conn| {
                conn.pragma_update(None, "foreign_keys", &0)?;
                conn.execute(
                    "UPDATE app_settings SET active_workplace_id = 'ghost' WHERE id = 1",
                    [],
                )?;
                Ok(())
            })
            .unwrap();

        service.refresh_data().unwrap();

        assert_eq!(service.active_workplace().unwrap().id, workplace.id);
        assert_eq!(
            service.settings().active_workplace_id.as_deref(),
            Some(workplace.id.as_str())
        );
    }

    #[test]
    fn deleting_last_workplace_clears_selection_and_data() {
        let (service, _guard) = setup_service();
        let labor = sample_labor(&service, "Akbar", 1000);
        service
            .mark_attendance(
                &labor.id,
                "2024-01-01".parse().unwrap(),
                AttendanceStatus::Present,
            )
            .unwrap();

        let workplace = service.active_workplace().unwrap();
        service.delete_workplace(&workplace.id).unwrap();

        assert!(service.active_workplace().is_none());
        assert!(service.workplaces().is_empty());
        assert!(service.labors().is_empty());
        assert!(service.attendance_records().is_empty());
        assert!(service.settings().active_workplace_id.is_none());
    }

    #[test]
    fn workplace_cascade_removes_child_rows() {
        let (service, _guard) = setup_service();
        let labor = sample_labor(&service, "Akbar", 1000);
        service
            .mark_attendance(
                &labor.id,
                "2024-01-01".parse().unwrap(),
                AttendanceStatus::Present,
            )
            .unwrap();
        service
            .add_payment(PaymentCreateInput {
                labor_id: labor.id.clone(),
                amount: Decimal::from(100),
                date: "2024-01-02".parse().unwrap(),
                payment_type: PaymentType::Daily,
                notes: None,
            })
            .unwrap();

        let workplace = service.active_workplace().unwrap();
        service.delete_workplace(&workplace.id).unwrap();

        let (labors, attendance, payments) = service
            .db
            .with_connection(|conn| {
                Ok((
                    conn.query_row("SELECT COUNT(*) FROM labors", [], |row| {
                        row.get::<_, i64>(0)
                    })?,
                    conn.query_row("SELECT COUNT(*) FROM attendance_records", [], |row| {
                        row.get::<_, i64>(0)
                    })?,
                    conn.query_row("SELECT COUNT(*) FROM payment_records", [], |row| {
                        row.get::<_, i64>(0)
                    })?,
                ))
            })
            .unwrap();
        assert_eq!(labors, 0);
        assert_eq!(attendance, 0);
        assert_eq!(payments, 0);
    }

    #[test]
    fn labors_of_other_workplaces_are_invisible() {
        let (service, _guard) = setup_service();
        let labor = sample_labor(&service, "Akbar", 1000);

        let second = service
            .add_workplace(WorkplaceCreateInput {
                name: "Site B".to_string(),
                description: None,
            })
            .unwrap();
        service.set_active_workplace(&second.id).unwrap();

        assert!(service.labors().is_empty());
        let err = service
            .mark_attendance(
                &labor.id,
                "2024-01-01".parse().unwrap(),
                AttendanceStatus::Present,
            )
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn invalid_money_inputs_are_rejected() {
        let (service, _guard) = setup_service();

        let err = service
            .add_labor(LaborCreateInput {
                name: "Akbar".to_string(),
                phone: "0300-1234567".to_string(),
                daily_wage: Decimal::ZERO,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidWage { .. }));

        let labor = sample_labor(&service, "Akbar", 1000);
        let err = service
            .add_payment(PaymentCreateInput {
                labor_id: labor.id,
                amount: Decimal::from(-50),
                date: "2024-01-02".parse().unwrap(),
                payment_type: PaymentType::Daily,
                notes: None,
            })
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount { .. }));
    }

    #[test]
    fn blank_names_and_bad_phones_are_rejected() {
        let (service, _guard) = setup_service();

        let err = service
            .add_labor(LaborCreateInput {
                name: "   ".to_string(),
                phone: "0300-1234567".to_string(),
                daily_wage: Decimal::from(1000),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        let err = service
            .add_labor(LaborCreateInput {
                name: "Akbar".to_string(),
                phone: "call me".to_string(),
                daily_wage: Decimal::from(1000),
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn payment_update_and_delete_round_trip() {
        let (service, _guard) = setup_service();
        let labor = sample_labor(&service, "Akbar", 1000);
        let payment = service
            .add_payment(PaymentCreateInput {
                labor_id: labor.id.clone(),
                amount: Decimal::from(300),
                date: "2024-01-02".parse().unwrap(),
                payment_type: PaymentType::Partial,
                notes: Some("advance".to_string()),
            })
            .unwrap();

        let updated = service
            .update_payment(
                &payment.id,
                PaymentUpdateInput {
                    amount: Some(Decimal::from(450)),
                    notes: Some(None),
                    ..PaymentUpdateInput::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount, Decimal::from(450));
        assert!(updated.notes.is_none());

        service.delete_payment(&payment.id).unwrap();
        assert!(service.payment_records().is_empty());

        let err = service.delete_payment(&payment.id).unwrap_err();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn update_settings_rejects_unknown_options() {
        let (service, _guard) = setup_service();
        let mut settings = service.settings();
        settings.theme = "sepia".to_string();

        let err = service.update_settings(settings).unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[test]
    fn reset_returns_to_first_launch_state() {
        let (service, _guard) = setup_service();
        sample_labor(&service, "Akbar", 1000);

        service.reset_all_data().unwrap();

        assert!(service.workplaces().is_empty());
        assert!(service.labors().is_empty());
        assert!(service.active_workplace().is_none());
        assert!(!service.settings().has_completed_onboarding);
    }
}
