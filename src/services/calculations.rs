use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::attendance::{AttendanceRecord, AttendanceStatus};
use crate::models::labor::Labor;
use crate::models::payment::PaymentRecord;
use crate::models::report::{
    DashboardStats, LaborPerformance, LaborSummary, ReportFilters, ReportPeriod, ReportSummary,
};

const TOP_PERFORMER_LIMIT: usize = 5;

/// The wage earned for one attendance mark, taken from the labor's daily
/// wage at that moment. Present earns the full rate, half earns half,
/// absent earns nothing.
pub fn wage_for(daily_wage: Decimal, status: AttendanceStatus) -> Decimal {
    match status {
        AttendanceStatus::Present => daily_wage,
        AttendanceStatus::Half => daily_wage / Decimal::TWO,
        AttendanceStatus::Absent => Decimal::ZERO,
    }
}

/// Lifetime totals for one labor. Both record sets are filtered by
/// `labor_id` here; the caller supplies records already scoped to the
/// relevant workplace.
pub fn labor_summary(
    labor: &Labor,
    attendance_records: &[AttendanceRecord],
    payment_records: &[PaymentRecord],
) -> LaborSummary {
    let labor_attendance: Vec<&AttendanceRecord> = attendance_records
        .iter()
        .filter(|record| record.labor_id == labor.id)
        .collect();
    let labor_payments: Vec<&PaymentRecord> = payment_records
        .iter()
        .filter(|payment| payment.labor_id == labor.id)
        .collect();

    let total_earned: Decimal = labor_attendance.iter().map(|record| record.wage).sum();
    let total_paid: Decimal = labor_payments.iter().map(|payment| payment.amount).sum();

    let count_status = |status: AttendanceStatus| {
        labor_attendance
            .iter()
            .filter(|record| record.status == status)
            .count()
    };

    LaborSummary {
        labor: labor.clone(),
        total_earned,
        total_paid,
        // Negative means the labor has been overpaid; that is a valid state.
        pending_balance: total_earned - total_paid,
        total_days_worked: labor_attendance.len(),
        total_days_present: count_status(AttendanceStatus::Present),
        total_days_half: count_status(AttendanceStatus::Half),
        total_days_absent: count_status(AttendanceStatus::Absent),
    }
}

/// Headline numbers for the given calendar day. `total_pending_amount` is
/// the net of all pending balances: overpaid labors offset underpaid ones.
pub fn dashboard_stats(
    labors: &[Labor],
    attendance_records: &[AttendanceRecord],
    payment_records: &[PaymentRecord],
    today: NaiveDate,
) -> DashboardStats {
    let today_attendance: Vec<&AttendanceRecord> = attendance_records
        .iter()
        .filter(|record| record.date == today)
        .collect();

    let count_status = |status: AttendanceStatus| {
        today_attendance
            .iter()
            .filter(|record| record.status == status)
            .count()
    };

    let total_pending_amount = labors
        .iter()
        .map(|labor| labor_summary(labor, attendance_records, payment_records).pending_balance)
        .sum();

    DashboardStats {
        total_labors: labors.len(),
        present_today: count_status(AttendanceStatus::Present),
        absent_today: count_status(AttendanceStatus::Absent),
        half_day_today: count_status(AttendanceStatus::Half),
        total_pending_amount,
    }
}

/// Resolves report filters to an inclusive date range. `week` reaches seven
/// days back, `month` starts at the first of the current month, and a
/// `custom` period without both bounds falls back to the month range.
pub fn report_range(filters: &ReportFilters, today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let month_start = today.with_day(1).unwrap_or(today);

    match filters.period {
        ReportPeriod::Week => (today - Duration::days(7), today),
        ReportPeriod::Month => (month_start, today),
        ReportPeriod::Custom => match (filters.start_date, filters.end_date) {
            (Some(start), Some(end)) => (start, end),
            _ => (month_start, today),
        },
    }
}

/// Aggregates a report for the resolved period: earned/paid and the status
/// counts over records inside the range, the lifetime net pending balance,
/// and the top five earners of the period (stable order on ties).
pub fn report_summary(
    labors: &[Labor],
    attendance_records: &[AttendanceRecord],
    payment_records: &[PaymentRecord],
    filters: &ReportFilters,
    today: NaiveDate,
) -> ReportSummary {
    let (start_date, end_date) = report_range(filters, today);

    let in_range = |date: NaiveDate| date >= start_date && date <= end_date;

    let filtered_attendance: Vec<&AttendanceRecord> = attendance_records
        .iter()
        .filter(|record| in_range(record.date))
        .collect();
    let filtered_payments: Vec<&PaymentRecord> = payment_records
        .iter()
        .filter(|payment| in_range(payment.date))
        .collect();

    let total_earned: Decimal = filtered_attendance.iter().map(|record| record.wage).sum();
    let total_paid: Decimal = filtered_payments.iter().map(|payment| payment.amount).sum();
    let total_pending: Decimal = labors
        .iter()
        .map(|labor| labor_summary(labor, attendance_records, payment_records).pending_balance)
        .sum();

    let count_status = |status: AttendanceStatus| {
        filtered_attendance
            .iter()
            .filter(|record| record.status == status)
            .count()
    };

    let mut performance: Vec<LaborPerformance> = labors
        .iter()
        .map(|labor| {
            let labor_attendance: Vec<&&AttendanceRecord> = filtered_attendance
                .iter()
                .filter(|record| record.labor_id == labor.id)
                .collect();
            let total_worked = labor_attendance
                .iter()
                .filter(|record| record.status != AttendanceStatus::Absent)
                .count();
            let total_earned: Decimal = labor_attendance.iter().map(|record| record.wage).sum();
            let attendance_rate = if labor_attendance.is_empty() {
                0.0
            } else {
                total_worked as f64 / labor_attendance.len() as f64 * 100.0
            };

            LaborPerformance {
                labor: labor.clone(),
                total_worked,
                total_earned,
                attendance_rate,
            }
        })
        .collect();

    // Stable sort keeps insertion order between equal earners.
    performance.sort_by(|a, b| b.total_earned.cmp(&a.total_earned));
    performance.truncate(TOP_PERFORMER_LIMIT);

    ReportSummary {
        period: filters.period,
        start_date,
        end_date,
        total_earned,
        total_paid,
        total_pending,
        total_days: filtered_attendance.len(),
        present_days: count_status(AttendanceStatus::Present),
        half_days: count_status(AttendanceStatus::Half),
        absent_days: count_status(AttendanceStatus::Absent),
        top_performers: performance,
    }
}
