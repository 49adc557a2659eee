use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::attendance::AttendanceRecord;
use crate::models::labor::Labor;
use crate::models::payment::PaymentRecord;
use crate::models::settings::AppSettings;
use crate::models::workplace::Workplace;

pub const BACKUP_SCHEMA_VERSION: &str = "2.0";

/// The portable backup document: a complete snapshot of every collection.
///
/// Collections default to empty so documents from older app versions (which
/// had no `workplaces` key) and documents with pruned collections still
/// parse; unknown top-level fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default)]
    pub workplaces: Vec<Workplace>,
    #[serde(default)]
    pub labors: Vec<Labor>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    #[serde(default)]
    pub settings: Option<AppSettings>,
    #[serde(default)]
    pub export_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: Option<String>,
}
