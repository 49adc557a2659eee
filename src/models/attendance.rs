use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Attendance for one labor on one calendar day. At most one record exists
/// per `(labor_id, date)`; marking again replaces the previous record.
/// `wage` is fixed from the labor's daily wage at mark time and is never
/// recomputed when the wage rate changes later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    #[serde(default)]
    pub workplace_id: String,
    pub labor_id: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub wage: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Half,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::Half => "half",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("invalid attendance status: {0}")]
pub struct ParseAttendanceStatusError(String);

impl FromStr for AttendanceStatus {
    type Err = ParseAttendanceStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "half" => Ok(AttendanceStatus::Half),
            other => Err(ParseAttendanceStatusError(other.to_string())),
        }
    }
}
