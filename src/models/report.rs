use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::labor::Labor;

/// Lifetime financial and attendance totals for one labor, derived on demand
/// from its attendance and payment records. `pending_balance` goes negative
/// when a labor has been paid more than earned; that is data, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaborSummary {
    pub labor: Labor,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_earned: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub pending_balance: Decimal,
    pub total_days_worked: usize,
    pub total_days_present: usize,
    pub total_days_half: usize,
    pub total_days_absent: usize,
}

/// Headline numbers for the active workplace on the current calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_labors: usize,
    pub present_today: usize,
    pub absent_today: usize,
    pub half_day_today: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_pending_amount: Decimal,
}

impl Default for DashboardStats {
    fn default() -> Self {
        Self {
            total_labors: 0,
            present_today: 0,
            absent_today: 0,
            half_day_today: 0,
            total_pending_amount: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Week,
    Month,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    pub period: ReportPeriod,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// One entry of the ranked top-performers list: period-scoped earnings and
/// attendance for a single labor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaborPerformance {
    pub labor: Labor,
    pub total_worked: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_earned: Decimal,
    pub attendance_rate: f64,
}

/// Aggregated report for a date range. Earned/paid and the status counts are
/// scoped to the range; `total_pending` is the lifetime net balance across
/// all labors, matching what the balance screens show.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub period: ReportPeriod,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_earned: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_paid: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_pending: Decimal,
    pub total_days: usize,
    pub present_days: usize,
    pub half_days: usize,
    pub absent_days: usize,
    pub top_performers: Vec<LaborPerformance>,
}
